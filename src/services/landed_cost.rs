use crate::entities::supplier_shipping;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};

/// Per-unit landed cost for one price observation.
///
/// Only the per-case fee is allocated to units. `flat_fee` and
/// `free_shipping_threshold` are stored on the profile but not applied here.
pub fn landed_cost(
    unit_cost: Decimal,
    case_pack: i32,
    shipping: Option<&supplier_shipping::Model>,
) -> Decimal {
    let Some(shipping) = shipping else {
        return unit_cost;
    };

    let per_unit_shipping = match shipping.per_case_fee {
        Some(fee) if !fee.is_zero() && case_pack > 0 => fee / Decimal::from(case_pack),
        _ => Decimal::ZERO,
    };

    (unit_cost + per_unit_shipping).round_dp(4)
}

/// Most recent shipping profile for a supplier, if any
pub async fn latest_shipping_profile<C: ConnectionTrait>(
    db: &C,
    supplier_id: i32,
) -> Result<Option<supplier_shipping::Model>, DbErr> {
    supplier_shipping::Entity::find()
        .filter(supplier_shipping::Column::SupplierId.eq(supplier_id))
        .order_by_desc(supplier_shipping::Column::EffectiveDate)
        .order_by_desc(supplier_shipping::Column::Id)
        .one(db)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn profile(per_case_fee: Option<Decimal>, flat_fee: Option<Decimal>) -> supplier_shipping::Model {
        supplier_shipping::Model {
            id: 1,
            supplier_id: 1,
            method: "delivery".to_string(),
            per_case_fee,
            flat_fee,
            free_shipping_threshold: Some(dec!(500)),
            effective_date: Utc::now(),
        }
    }

    #[test]
    fn no_profile_returns_unit_cost_unchanged() {
        assert_eq!(landed_cost(dec!(1.23456), 12, None), dec!(1.23456));
    }

    #[rstest]
    #[case(dec!(2.00), 12, Some(dec!(6.00)), dec!(2.50))]
    #[case(dec!(1.00), 3, Some(dec!(1.00)), dec!(1.3333))]
    #[case(dec!(4.25), 24, None, dec!(4.25))]
    #[case(dec!(4.25), 0, Some(dec!(6.00)), dec!(4.25))]
    #[case(dec!(4.25), 6, Some(dec!(0)), dec!(4.25))]
    fn per_case_fee_is_spread_over_the_pack(
        #[case] unit_cost: Decimal,
        #[case] case_pack: i32,
        #[case] per_case_fee: Option<Decimal>,
        #[case] expected: Decimal,
    ) {
        let shipping = profile(per_case_fee, None);
        assert_eq!(landed_cost(unit_cost, case_pack, Some(&shipping)), expected);
    }

    #[test]
    fn flat_fee_is_not_applied_per_unit() {
        let shipping = profile(None, Some(dec!(25.00)));
        assert_eq!(landed_cost(dec!(3.10), 12, Some(&shipping)), dec!(3.10));
    }
}
