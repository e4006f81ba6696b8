//! Conversion and standardization MCP tools

use serde::Serialize;

use crate::quantity::{
    convert_units, Confidence, RawIngredient, Scale, StandardizedQuantity, Standardizer,
};

/// Largest batch accepted by standardize_ingredients
pub const MAX_BATCH_SIZE: usize = 500;

/// Response for convert_units
#[derive(Debug, Serialize)]
pub struct ConvertUnitsResponse {
    pub quantity: f64,
    pub from_unit: String,
    pub to_unit: String,
    pub scale: Scale,
    pub result: f64,
}

/// Response for standardize_ingredient
#[derive(Debug, Serialize)]
pub struct StandardizeResponse {
    pub ingredient_name: String,
    pub input_quantity: f64,
    pub input_unit: String,
    #[serde(flatten)]
    pub standardized: StandardizedQuantity,
}

/// Response for standardize_ingredients
#[derive(Debug, Serialize)]
pub struct StandardizeBatchResponse {
    pub results: Vec<StandardizeResponse>,
    pub high_confidence: usize,
    pub low_confidence: usize,
}

/// Convert a quantity between two units of one scale
pub fn convert(
    quantity: f64,
    from_unit: &str,
    to_unit: &str,
    scale: &str,
) -> Result<ConvertUnitsResponse, String> {
    let scale = Scale::from_str(scale)
        .ok_or_else(|| format!("Unknown scale '{}': expected 'volume' or 'mass'", scale))?;

    let result = convert_units(quantity, from_unit, to_unit, scale).map_err(|e| {
        tracing::warn!("convert_units rejected: {}", e);
        e.to_string()
    })?;

    Ok(ConvertUnitsResponse {
        quantity,
        from_unit: from_unit.to_string(),
        to_unit: to_unit.to_string(),
        scale,
        result,
    })
}

/// Standardize one raw ingredient quantity
pub fn standardize_one(engine: &Standardizer, raw: RawIngredient) -> StandardizeResponse {
    let standardized = engine.standardize(raw.quantity, &raw.unit, &raw.ingredient_name);
    StandardizeResponse {
        ingredient_name: raw.ingredient_name,
        input_quantity: raw.quantity,
        input_unit: raw.unit,
        standardized,
    }
}

/// Standardize a recipe's worth of ingredients, preserving order
pub fn standardize_many(
    engine: &Standardizer,
    ingredients: Vec<RawIngredient>,
) -> Result<StandardizeBatchResponse, String> {
    if ingredients.len() > MAX_BATCH_SIZE {
        return Err(format!(
            "Too many ingredients: {} (max {})",
            ingredients.len(),
            MAX_BATCH_SIZE
        ));
    }

    let results: Vec<StandardizeResponse> = ingredients
        .into_iter()
        .map(|raw| standardize_one(engine, raw))
        .collect();

    let high_confidence = results
        .iter()
        .filter(|r| r.standardized.confidence == Confidence::High)
        .count();
    let low_confidence = results
        .iter()
        .filter(|r| r.standardized.confidence == Confidence::Low)
        .count();

    Ok(StandardizeBatchResponse {
        results,
        high_confidence,
        low_confidence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(quantity: f64, unit: &str, name: &str) -> RawIngredient {
        RawIngredient {
            quantity,
            unit: unit.to_string(),
            ingredient_name: name.to_string(),
        }
    }

    #[test]
    fn test_convert_tool() {
        let resp = convert(1.0, "l", "ml", "volume").unwrap();
        assert_eq!(resp.result, 1000.0);
        assert_eq!(resp.scale, Scale::Volume);
    }

    #[test]
    fn test_convert_tool_errors() {
        let err = convert(1.0, "cup", "g", "mass").unwrap_err();
        assert!(err.contains("'cup'"), "{}", err);

        let err = convert(1.0, "g", "kg", "length").unwrap_err();
        assert!(err.contains("Unknown scale"), "{}", err);
    }

    #[test]
    fn test_standardize_one_flattens_result() {
        let engine = Standardizer::default();
        let resp = standardize_one(&engine, raw(2.0, "cups", "milk"));
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["ingredient_name"], "milk");
        assert_eq!(json["quantity"], 488);
        assert_eq!(json["unit"], "ml");
        assert_eq!(json["confidence"], "high");
    }

    #[test]
    fn test_standardize_many_counts_confidence() {
        let engine = Standardizer::default();
        let resp = standardize_many(
            &engine,
            vec![
                raw(227.0, "g", "chicken breast"),
                raw(1.0, "whole", "onion"),
                raw(1.0, "cup", "flour"),
            ],
        )
        .unwrap();
        assert_eq!(resp.results.len(), 3);
        assert_eq!(resp.high_confidence, 2);
        assert_eq!(resp.low_confidence, 1);
        assert_eq!(resp.results[1].ingredient_name, "onion");
    }

    #[test]
    fn test_standardize_many_rejects_oversized_batch() {
        let engine = Standardizer::default();
        let batch = (0..=MAX_BATCH_SIZE).map(|_| raw(1.0, "g", "salt")).collect();
        assert!(standardize_many(&engine, batch).is_err());
    }
}
