use anyhow::Result;
use serde::Serialize;

/// Pretty JSON for stdout; analysis records serialize as-is.
pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use crate::output::json::render_json;
    use crate::viability::ViabilityTier;

    #[test]
    fn enums_render_as_snake_case() {
        let rendered =
            render_json(&[ViabilityTier::Optimal, ViabilityTier::Blocked]).expect("renders");
        let parsed: Value = serde_json::from_str(&rendered).expect("valid json");
        assert_eq!(parsed, serde_json::json!(["optimal", "blocked"]));
    }
}
