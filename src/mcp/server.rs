//! Grocer MCP Server Implementation
//!
//! Implements the MCP server with all Grocer tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::db::Database;
use crate::models::StoredDensityCreate;
use crate::quantity::RawIngredient;
use crate::tools::densities;
use crate::tools::standardize;
use crate::tools::status::StatusTracker;
use crate::tools::ActiveEngine;

/// Grocer MCP Service
#[derive(Clone)]
pub struct GrocerService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    engine: ActiveEngine,
    tool_router: ToolRouter<GrocerService>,
}

impl GrocerService {
    pub fn new(database_path: PathBuf, database: Database, engine: ActiveEngine) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path))),
            database,
            engine,
            tool_router: Self::tool_router(),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// Conversion Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ConvertUnitsParams {
    /// Amount to convert (any real number)
    pub quantity: f64,
    /// Unit to convert from (e.g. "cup", "tbsp", "oz")
    pub from_unit: String,
    /// Unit to convert to (must be in the same scale)
    pub to_unit: String,
    /// Scale: "volume" or "mass"
    pub scale: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct StandardizeIngredientParams {
    /// Quantity as written in the recipe
    pub quantity: f64,
    /// Unit as written in the recipe (empty if none)
    #[serde(default)]
    pub unit: String,
    /// Plain ingredient name (e.g. "onion", "milk")
    pub ingredient_name: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct StandardizeIngredientsParams {
    /// Ingredients in recipe order
    pub ingredients: Vec<StandardizeIngredientParams>,
}

impl From<StandardizeIngredientParams> for RawIngredient {
    fn from(p: StandardizeIngredientParams) -> Self {
        Self {
            quantity: p.quantity,
            unit: p.unit,
            ingredient_name: p.ingredient_name,
        }
    }
}

// ============================================================================
// Density Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LookupDensityParams {
    /// Ingredient name (case-insensitive)
    pub ingredient_name: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListDensitiesParams {
    /// Only show "builtin" or "stored" entries (optional)
    pub source: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddDensityParams {
    /// Ingredient name
    pub name: String,
    /// Grams per milliliter (water = 1.0)
    pub density: f64,
    /// Shopping unit: g, ml, whole, or clove
    pub standard_unit: String,
    /// Grams per whole/clove (omit for g and ml)
    pub standard_size: Option<f64>,
    /// Optional notes (source of the figure, etc.)
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteDensityParams {
    /// Stored ingredient name to delete
    pub name: String,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl GrocerService {
    // --- Status ---

    #[tool(description = "Get the current status of the Grocer service including build info, database status, density table size, and process information")]
    async fn grocer_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status(&self.engine.current());
        to_json(&status)
    }

    #[tool(description = "Get instructions for standardizing recipe quantities. Call this before importing a recipe or when unsure how to read confidence values.")]
    fn standardization_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::STANDARDIZATION_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(STANDARDIZATION_INSTRUCTIONS)]))
    }

    // --- Conversion ---

    #[tool(description = "Convert a quantity between two units of the same scale (volume or mass). Fails on units outside the scale.")]
    fn convert_units(
        &self,
        Parameters(p): Parameters<ConvertUnitsParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = standardize::convert(p.quantity, &p.from_unit, &p.to_unit, &p.scale)
            .map_err(|e| McpError::invalid_params(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Standardize one recipe quantity into a shopping-list quantity (g, ml, or counted units) with a confidence level. Never fails: unknown ingredients or units come back with low confidence.")]
    fn standardize_ingredient(
        &self,
        Parameters(p): Parameters<StandardizeIngredientParams>,
    ) -> Result<CallToolResult, McpError> {
        let engine = self.engine.current();
        let result = standardize::standardize_one(&engine, p.into());
        to_json(&result)
    }

    #[tool(description = "Standardize all ingredients of a recipe in one call. PREFERRED over standardize_ingredient when importing a recipe. Results are returned in input order.")]
    fn standardize_ingredients(
        &self,
        Parameters(p): Parameters<StandardizeIngredientsParams>,
    ) -> Result<CallToolResult, McpError> {
        let engine = self.engine.current();
        let raw: Vec<RawIngredient> = p.ingredients.into_iter().map(RawIngredient::from).collect();
        let result = standardize::standardize_many(&engine, raw)
            .map_err(|e| McpError::invalid_params(e, None))?;
        to_json(&result)
    }

    // --- Densities ---

    #[tool(description = "Look up the active density record for an ingredient, including whether it is built in or stored")]
    fn lookup_ingredient_density(
        &self,
        Parameters(p): Parameters<LookupDensityParams>,
    ) -> Result<CallToolResult, McpError> {
        match densities::lookup_density(&self.engine, &p.ingredient_name) {
            Some(detail) => to_json(&detail),
            None => to_json(&serde_json::json!({
                "error": "Ingredient not found",
                "ingredient_name": p.ingredient_name,
            })),
        }
    }

    #[tool(description = "List active ingredient densities alphabetically, optionally only built-in or only stored entries")]
    fn list_ingredient_densities(
        &self,
        Parameters(p): Parameters<ListDensitiesParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = densities::list_densities(&self.engine, p.source.as_deref())
            .map_err(|e| McpError::invalid_params(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Add or replace a stored ingredient density. Overrides a built-in entry with the same name. Takes effect immediately.")]
    fn add_ingredient_density(
        &self,
        Parameters(p): Parameters<AddDensityParams>,
    ) -> Result<CallToolResult, McpError> {
        let data = StoredDensityCreate {
            name: p.name,
            density: p.density,
            standard_unit: p.standard_unit,
            standard_size: p.standard_size,
            notes: p.notes,
        };
        let result = densities::add_density(&self.database, &self.engine, data)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Delete a stored ingredient density. Built-in entries cannot be deleted; deleting a stored override restores the built-in entry.")]
    fn delete_ingredient_density(
        &self,
        Parameters(p): Parameters<DeleteDensityParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = densities::delete_density(&self.database, &self.engine, &p.name)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Ok(success) => to_json(&success),
            Err(blocked) => to_json(&blocked),
        }
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for GrocerService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "grocer".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Grocer".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Grocer - recipe quantity standardization for shopping lists. \
                 IMPORTANT: Call standardization_instructions before importing recipes. \
                 Standardize: standardize_ingredients (batch, preferred), standardize_ingredient. \
                 Convert: convert_units (volume or mass only). \
                 Densities: lookup_ingredient_density, list_ingredient_densities, \
                 add_ingredient_density, delete_ingredient_density. \
                 Status: grocer_status."
                    .into(),
            ),
        }
    }
}
