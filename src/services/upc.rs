//! Expansion of a scanned code into every code a supplier may have priced it under.

use crate::entities::upc_alias;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};

/// The one format transform applied to a scanned code.
///
/// A 12 digit UPC-A gains its zero-prefixed EAN-13 form; a 13 digit code with a
/// leading zero loses it. Any other code has no variant.
pub fn format_variant(upc: &str) -> Option<String> {
    match upc.len() {
        12 => Some(format!("0{}", upc)),
        13 if upc.starts_with('0') => Some(upc[1..].to_string()),
        _ => None,
    }
}

/// Builds the query set from the scanned code and its alias codes, in a stable order.
pub fn expand(upc: &str, alias_codes: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut codes = vec![upc.to_string()];

    for code in alias_codes {
        if !codes.contains(&code) {
            codes.push(code);
        }
    }

    if let Some(variant) = format_variant(upc) {
        if !codes.contains(&variant) {
            codes.push(variant);
        }
    }

    codes
}

/// Returns the scanned code first, then supplier codes aliased to it, then its format variant.
pub async fn resolve<C: ConnectionTrait>(db: &C, upc: &str) -> Result<Vec<String>, DbErr> {
    let aliases = upc_alias::Entity::find()
        .filter(upc_alias::Column::StandardUpc.eq(upc))
        .order_by_asc(upc_alias::Column::Id)
        .all(db)
        .await?;

    Ok(expand(upc, aliases.into_iter().map(|a| a.supplier_sku)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("012345678905", Some("0012345678905"))]
    #[case("0012345678905", Some("012345678905"))]
    #[case("4012345678901", None)]
    #[case("12345678", None)]
    #[case("", None)]
    fn format_variant_cases(#[case] upc: &str, #[case] expected: Option<&str>) {
        assert_eq!(format_variant(upc).as_deref(), expected);
    }

    #[test]
    fn expand_keeps_scanned_code_first_then_aliases_then_variant() {
        let codes = expand(
            "012345678905",
            vec!["CORE-1182".to_string(), "MCL-77".to_string()],
        );
        assert_eq!(
            codes,
            vec!["012345678905", "CORE-1182", "MCL-77", "0012345678905"]
        );
    }

    #[test]
    fn expand_drops_duplicate_alias_codes() {
        let codes = expand(
            "0012345678905",
            vec![
                "012345678905".to_string(),
                "X1".to_string(),
                "X1".to_string(),
                "0012345678905".to_string(),
            ],
        );
        assert_eq!(codes, vec!["0012345678905", "012345678905", "X1"]);
    }
}
