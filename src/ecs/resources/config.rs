use bevy_ecs::resource::Resource;

/// A kind the host faction sells, with its base market value.
#[derive(Debug, Clone)]
pub struct TradeGood {
    pub kind: String,
    pub unit_value: f64,
}

impl TradeGood {
    pub fn new(kind: impl Into<String>, unit_value: f64) -> Self {
        Self {
            kind: kind.into(),
            unit_value,
        }
    }
}

/// Every tunable of the visit engine in one resource.
#[derive(Resource, Debug, Clone)]
pub struct VisitConfig {
    // -- Goodwill penalties --
    /// Master gate; when off, detection still classifies and untracks but
    /// applies no goodwill change.
    pub enable_penalties: bool,
    pub enable_theft_penalty: bool,
    pub enable_caravan_penalty: bool,
    pub enable_destruction_penalty: bool,
    pub enable_minify_penalty: bool,
    pub enable_mining_penalty: bool,
    pub enable_encroach_penalty: bool,
    /// Flat component of the scaled penalty.
    pub base_penalty: i32,
    /// Per-unit-of-market-value component of the scaled penalty.
    pub penalty_scaling: f64,
    /// Fixed penalty for deconstruction, encroachment, and mining.
    /// Independent of the scaled-penalty tuning.
    pub flat_penalty: i32,

    // -- Leasing and trade --
    pub enable_leasing: bool,
    /// Lease rate per room per day, in silver.
    pub bed_cost_per_day: i64,
    pub max_lease_days: u32,
    /// Percent of the original cost refunded per remaining whole day.
    pub refund_rate_per_day: u32,
    pub max_trade_quantity: u32,
    pub trade_goods: Vec<TradeGood>,

    // -- Periodic events --
    pub enable_events: bool,
    pub resupply_interval_days: u32,
    /// Probability gate for each incursion cycle.
    pub incursion_chance: f64,
    pub incursion_days_min: u32,
    pub incursion_days_max: u32,
    /// Days after a visit during which a session is skipped by the
    /// incursion cycle.
    pub threat_grace_days: u32,

    // -- Scene seeding --
    /// Chebyshev radius of the friendly zone around host structures.
    pub home_radius: i32,
    /// Nutrition per materialized ration unit.
    pub ration_nutrition: f64,

    // -- Diplomacy --
    /// Goodwill total at or below which a faction turns hostile.
    pub hostility_threshold: i32,
}

impl Default for VisitConfig {
    fn default() -> Self {
        Self {
            enable_penalties: true,
            enable_theft_penalty: true,
            enable_caravan_penalty: true,
            enable_destruction_penalty: true,
            enable_minify_penalty: true,
            enable_mining_penalty: true,
            enable_encroach_penalty: true,
            base_penalty: 5,
            penalty_scaling: 0.1,
            flat_penalty: 5,

            enable_leasing: true,
            bed_cost_per_day: 30,
            max_lease_days: 30,
            refund_rate_per_day: 10,
            max_trade_quantity: 60,
            trade_goods: vec![
                TradeGood::new("MedicineHerbal", 10.0),
                TradeGood::new("MedicineIndustrial", 18.0),
                TradeGood::new("Ration", 15.0),
                TradeGood::new("SurvivalRation", 24.0),
                TradeGood::new("Beer", 12.0),
            ],

            enable_events: true,
            resupply_interval_days: 1,
            incursion_chance: 0.7,
            incursion_days_min: 2,
            incursion_days_max: 5,
            threat_grace_days: 2,

            home_radius: 3,
            ration_nutrition: 0.9,

            hostility_threshold: -75,
        }
    }
}

impl VisitConfig {
    /// Unit price of a configured trade good, if the kind is purchasable.
    pub fn trade_price(&self, kind: &str) -> Option<i64> {
        self.trade_goods
            .iter()
            .find(|g| g.kind == kind)
            .map(|g| g.unit_value.ceil() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tuning() {
        let config = VisitConfig::default();
        assert_eq!(config.base_penalty, 5);
        assert_eq!(config.penalty_scaling, 0.1);
        assert_eq!(config.flat_penalty, 5);
        assert_eq!(config.bed_cost_per_day, 30);
        assert_eq!(config.max_lease_days, 30);
        assert_eq!(config.refund_rate_per_day, 10);
        assert_eq!(config.max_trade_quantity, 60);
        assert_eq!(config.resupply_interval_days, 1);
        assert_eq!(config.incursion_chance, 0.7);
        assert_eq!(config.incursion_days_min, 2);
        assert_eq!(config.incursion_days_max, 5);
        assert_eq!(config.home_radius, 3);
        assert_eq!(config.trade_goods.len(), 5);
    }

    #[test]
    fn trade_price_ceils_unit_value() {
        let mut config = VisitConfig::default();
        config.trade_goods.push(TradeGood::new("Hops", 2.3));
        assert_eq!(config.trade_price("Hops"), Some(3));
        assert_eq!(config.trade_price("Ration"), Some(15));
        assert_eq!(config.trade_price("Uranium"), None);
    }
}
