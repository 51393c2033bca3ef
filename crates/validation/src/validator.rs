use crate::error::ValidationError;
use crate::options::*;
use crate::primitives::{FieldChecker, Validated};
use crate::raw::RawQuery;
use crate::rules::{
    DEFAULT_MIN_TVL, MAX_CATEGORIES, MAX_CHAINS, MAX_MIN_TVL, MAX_TIMEFRAMES, ValidationRules,
};
use core_types::{Endpoint, Timeframe};

const DETAILS: &[(&str, Detail)] = &[
    ("minimal", Detail::Minimal),
    ("basic", Detail::Basic),
    ("full", Detail::Full),
];

const DOMINANCE_VIEWS: &[(&str, DominanceView)] = &[
    ("protocols", DominanceView::Protocols),
    ("categories", DominanceView::Categories),
    ("chains", DominanceView::Chains),
];

const DIRECTIONS: &[(&str, MoverDirection)] = &[
    ("gainers", MoverDirection::Gainers),
    ("losers", MoverDirection::Losers),
    ("both", MoverDirection::Both),
];

// Sort-by allow-lists. The first entry is the fallback for an invalid value.
const DOMINANCE_SORTS: &[(&str, DominanceSort)] = &[
    ("tvl", DominanceSort::Tvl),
    ("dominance", DominanceSort::Dominance),
    ("name", DominanceSort::Name),
];

const TRENDING_SORTS: &[(&str, TrendingSort)] = &[
    ("trending_score", TrendingSort::TrendingScore),
    ("growth_rate", TrendingSort::GrowthRate),
    ("momentum", TrendingSort::Momentum),
    ("tvl", TrendingSort::Tvl),
];

const PROTOCOL_SORTS: &[(&str, ProtocolSort)] = &[
    ("tvl", ProtocolSort::Tvl),
    ("change_1d", ProtocolSort::Change1d),
    ("change_7d", ProtocolSort::Change7d),
    ("name", ProtocolSort::Name),
];

const CHAIN_SORTS: &[(&str, ChainSort)] = &[
    ("tvl", ChainSort::Tvl),
    ("protocols", ChainSort::Protocols),
    ("change_1d", ChainSort::Change1d),
    ("change_7d", ChainSort::Change7d),
    ("dominance", ChainSort::Dominance),
];

/// The validation capability the intelligence layer depends on.
pub trait QueryValidation: Send + Sync {
    fn overview(&self, raw: &RawQuery) -> Result<OverviewOptions, ValidationError>;
    fn dominance(&self, raw: &RawQuery) -> Result<DominanceOptions, ValidationError>;
    fn trending(&self, raw: &RawQuery) -> Result<TrendingOptions, ValidationError>;
    fn movers(&self, raw: &RawQuery) -> Result<MoversOptions, ValidationError>;
    fn chain_ecosystem(&self, raw: &RawQuery) -> Result<ChainEcosystemOptions, ValidationError>;
    fn chains_overview(&self, raw: &RawQuery) -> Result<ChainsOverviewOptions, ValidationError>;

    /// The provider's name for a canonical chain id accepted by `chain_ecosystem`.
    fn provider_chain_name(&self, chain_id: &str) -> Option<&'static str>;

    /// Validates `raw` for the endpoint named by `endpoint`.
    fn validate(&self, endpoint: Endpoint, raw: &RawQuery) -> Result<EndpointQuery, ValidationError> {
        Ok(match endpoint {
            Endpoint::Overview => EndpointQuery::Overview(self.overview(raw)?),
            Endpoint::Dominance => EndpointQuery::Dominance(self.dominance(raw)?),
            Endpoint::Trending => EndpointQuery::Trending(self.trending(raw)?),
            Endpoint::Movers => EndpointQuery::Movers(self.movers(raw)?),
            Endpoint::ChainEcosystem => EndpointQuery::ChainEcosystem(self.chain_ecosystem(raw)?),
            Endpoint::ChainsOverview => EndpointQuery::ChainsOverview(self.chains_overview(raw)?),
        })
    }
}

/// Turns untrusted query input into typed, bounds-checked options.
///
/// Each `check_*` method inspects every field and returns the populated
/// options alongside all violations; the `QueryValidation` methods turn any
/// violation into one aggregated `ValidationError`.
#[derive(Debug, Clone, Default)]
pub struct QueryValidator {
    rules: ValidationRules,
}

impl QueryValidator {
    pub fn new(rules: ValidationRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    pub fn check_overview(&self, raw: &RawQuery) -> Validated<OverviewOptions> {
        let mut f = FieldChecker::new(raw);
        let options = OverviewOptions {
            detail: f.enumerated("detail", DETAILS, Detail::Basic),
            timeframe: f.timeframe("timeframe", Timeframe::OneDay),
            categories: f.list("categories", MAX_CATEGORIES, self.rules.categories),
            chains: f.list("chains", MAX_CHAINS, self.rules.chains),
            include_benchmarks: f.flag("includeBenchmarks", true),
        };
        f.finish(options)
    }

    pub fn check_dominance(&self, raw: &RawQuery) -> Validated<DominanceOptions> {
        let mut f = FieldChecker::new(raw);
        let options = DominanceOptions {
            view: f.enumerated("view", DOMINANCE_VIEWS, DominanceView::Protocols),
            limit: f.bounded_int("limit", 1, 100, 20) as usize,
            min_tvl: f.bounded_int("minTvl", 0, MAX_MIN_TVL, 0),
            categories: f.list("categories", MAX_CATEGORIES, self.rules.categories),
            chains: f.list("chains", MAX_CHAINS, self.rules.chains),
            sort_by: f.enumerated("sortBy", DOMINANCE_SORTS, DominanceSort::Tvl),
            include_concentration: f.flag("includeConcentration", true),
        };
        f.finish(options)
    }

    pub fn check_trending(&self, raw: &RawQuery) -> Validated<TrendingOptions> {
        let mut f = FieldChecker::new(raw);
        let options = TrendingOptions {
            timeframes: f.timeframes("timeframes", MAX_TIMEFRAMES, Timeframe::SevenDays),
            limit: f.bounded_int("limit", 1, 50, 10) as usize,
            min_tvl: f.bounded_int("minTvl", 0, MAX_MIN_TVL, DEFAULT_MIN_TVL),
            categories: f.list("categories", MAX_CATEGORIES, self.rules.categories),
            chains: f.list("chains", MAX_CHAINS, self.rules.chains),
            sort_by: f.enumerated("sortBy", TRENDING_SORTS, TrendingSort::TrendingScore),
            detail: f.enumerated("detail", DETAILS, Detail::Basic),
        };
        f.finish(options)
    }

    pub fn check_movers(&self, raw: &RawQuery) -> Validated<MoversOptions> {
        let mut f = FieldChecker::new(raw);
        let options = MoversOptions {
            timeframe: f.timeframe("timeframe", Timeframe::OneDay),
            direction: f.enumerated("direction", DIRECTIONS, MoverDirection::Both),
            limit: f.bounded_int("limit", 1, 50, 10) as usize,
            min_tvl: f.bounded_int("minTvl", 0, MAX_MIN_TVL, DEFAULT_MIN_TVL),
            min_change: f.bounded_float("minChange", 0.0, 1000.0, 1.0),
            categories: f.list("categories", MAX_CATEGORIES, self.rules.categories),
            chains: f.list("chains", MAX_CHAINS, self.rules.chains),
        };
        f.finish(options)
    }

    pub fn check_chain_ecosystem(&self, raw: &RawQuery) -> Validated<ChainEcosystemOptions> {
        let mut f = FieldChecker::new(raw);
        let options = ChainEcosystemOptions {
            chain: f.supported_chain("chain", &self.rules),
            detail: f.enumerated("detail", DETAILS, Detail::Basic),
            limit: f.bounded_int("limit", 1, 100, 20) as usize,
            sort_by: f.enumerated("sortBy", PROTOCOL_SORTS, ProtocolSort::Tvl),
            categories: f.list("categories", MAX_CATEGORIES, self.rules.categories),
        };
        f.finish(options)
    }

    pub fn check_chains_overview(&self, raw: &RawQuery) -> Validated<ChainsOverviewOptions> {
        let mut f = FieldChecker::new(raw);
        let options = ChainsOverviewOptions {
            limit: f.bounded_int("limit", 1, 100, 25) as usize,
            min_tvl: f.bounded_int("minTvl", 0, MAX_MIN_TVL, 0),
            sort_by: f.enumerated("sortBy", CHAIN_SORTS, ChainSort::Tvl),
            detail: f.enumerated("detail", DETAILS, Detail::Basic),
            include_benchmarks: f.flag("includeBenchmarks", true),
        };
        f.finish(options)
    }
}

impl QueryValidation for QueryValidator {
    fn overview(&self, raw: &RawQuery) -> Result<OverviewOptions, ValidationError> {
        self.check_overview(raw).into_result()
    }

    fn dominance(&self, raw: &RawQuery) -> Result<DominanceOptions, ValidationError> {
        self.check_dominance(raw).into_result()
    }

    fn trending(&self, raw: &RawQuery) -> Result<TrendingOptions, ValidationError> {
        self.check_trending(raw).into_result()
    }

    fn movers(&self, raw: &RawQuery) -> Result<MoversOptions, ValidationError> {
        self.check_movers(raw).into_result()
    }

    fn chain_ecosystem(&self, raw: &RawQuery) -> Result<ChainEcosystemOptions, ValidationError> {
        self.check_chain_ecosystem(raw).into_result()
    }

    fn chains_overview(&self, raw: &RawQuery) -> Result<ChainsOverviewOptions, ValidationError> {
        self.check_chains_overview(raw).into_result()
    }

    fn provider_chain_name(&self, chain_id: &str) -> Option<&'static str> {
        self.rules.provider_chain_name(chain_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::QueryValue;
    use serde_json::json;

    fn query(pairs: &[(&str, &str)]) -> RawQuery {
        RawQuery::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn test_defaults_when_nothing_supplied() {
        let v = QueryValidator::default();
        let overview = v.overview(&RawQuery::new()).unwrap();
        assert_eq!(overview.detail, Detail::Basic);
        assert_eq!(overview.timeframe, Timeframe::OneDay);
        assert_eq!(overview.categories, None);
        assert!(overview.include_benchmarks);

        let trending = v.trending(&RawQuery::new()).unwrap();
        assert_eq!(trending.timeframes, vec![Timeframe::SevenDays]);
        assert_eq!(trending.limit, 10);
        assert_eq!(trending.min_tvl as f64, core_types::LIQUIDITY_FLOOR);

        let movers = v.movers(&RawQuery::new()).unwrap();
        assert_eq!(movers.min_change, 1.0);
        assert_eq!(movers.min_tvl as f64, core_types::LIQUIDITY_FLOOR);
        assert_eq!(movers.direction, MoverDirection::Both);
    }

    #[test]
    fn test_limit_above_max_clamps_and_reports() {
        let v = QueryValidator::default();
        let checked = v.check_dominance(&query(&[("limit", "200")]));
        assert_eq!(checked.value.limit, 100);
        assert_eq!(checked.violations, vec!["limit cannot exceed 100".to_string()]);

        let err = checked.into_result().unwrap_err();
        assert!(err.to_string().contains("limit cannot exceed 100"));
    }

    #[test]
    fn test_limit_below_min_or_garbage_resets_to_default() {
        let v = QueryValidator::default();
        let low = v.check_dominance(&query(&[("limit", "0")]));
        assert_eq!(low.value.limit, 20);
        assert_eq!(low.violations, vec!["limit must be at least 1".to_string()]);

        let garbage = v.check_dominance(&query(&[("limit", "lots")]));
        assert_eq!(garbage.value.limit, 20);
        assert!(garbage.violations[0].contains("must be a number"));
    }

    #[test]
    fn test_min_tvl_clamps_high() {
        let v = QueryValidator::default();
        let checked = v.check_chains_overview(&query(&[("minTvl", "5e13")]));
        assert_eq!(checked.value.min_tvl, MAX_MIN_TVL);
        assert!(!checked.is_valid());
    }

    #[test]
    fn test_all_violations_are_aggregated() {
        let v = QueryValidator::default();
        let err = v
            .overview(&query(&[("detail", "everything"), ("timeframe", "2w")]))
            .unwrap_err();
        assert_eq!(err.violations.len(), 2);
        assert!(err.mentions("detail"));
        assert!(err.mentions("timeframe"));
    }

    #[test]
    fn test_enum_values_are_normalized() {
        let v = QueryValidator::default();
        let opts = v
            .trending(&query(&[("detail", "  FULL "), ("sortBy", "growthRate")]))
            .unwrap();
        assert_eq!(opts.detail, Detail::Full);
        assert_eq!(opts.sort_by, TrendingSort::GrowthRate);
    }

    #[test]
    fn test_invalid_sort_falls_back_to_first_allowed() {
        let v = QueryValidator::default();
        let checked = v.check_chains_overview(&query(&[("sortBy", "age")]));
        assert_eq!(checked.value.sort_by, ChainSort::Tvl);
        assert!(checked.violations[0].contains("tvl, protocols, change_1d, change_7d, dominance"));
    }

    #[test]
    fn test_lists_are_deduplicated_truncated_and_filtered() {
        let v = QueryValidator::default();
        let checked = v.check_dominance(&query(&[(
            "categories",
            "Dexes, lending,dexes,moon-farming, ,yield",
        )]));
        assert_eq!(
            checked.value.categories,
            Some(vec!["dexes".to_string(), "lending".to_string(), "yield".to_string()])
        );
        assert_eq!(checked.violations, vec!["Invalid categories: moon-farming".to_string()]);

        let many: Vec<&str> = crate::rules::CHAINS.iter().take(12).copied().collect();
        let joined = many.join(",");
        let capped = v.check_dominance(&query(&[("chains", joined.as_str())]));
        assert_eq!(capped.value.chains.as_ref().map(Vec::len), Some(MAX_CHAINS));
        assert!(capped.is_valid());
    }

    #[test]
    fn test_list_with_only_invalid_members_becomes_none() {
        let v = QueryValidator::default();
        let checked = v.check_overview(&query(&[("chains", "atlantis")]));
        assert_eq!(checked.value.chains, None);
        assert_eq!(checked.violations.len(), 1);
    }

    #[test]
    fn test_timeframes_fall_back_to_seven_days() {
        let v = QueryValidator::default();
        let checked = v.check_trending(&query(&[("timeframes", "90d,1y")]));
        assert_eq!(checked.value.timeframes, vec![Timeframe::SevenDays]);
        assert!(checked.violations[0].contains("90d"));

        let array = RawQuery::from_json(&json!({"timeframes": ["24H", "30d", "24h"]}));
        let opts = v.trending(&array).unwrap();
        assert_eq!(opts.timeframes, vec![Timeframe::OneDay, Timeframe::ThirtyDays]);
    }

    #[test]
    fn test_chain_alias_resolves_before_support_check() {
        let v = QueryValidator::default();
        let opts = v.chain_ecosystem(&query(&[("chain", " ETH ")])).unwrap();
        assert_eq!(opts.chain, "ethereum");
        let opts = v.chain_ecosystem(&query(&[("chain", "bsc")])).unwrap();
        assert_eq!(opts.chain, "binance-smart-chain");
    }

    #[test]
    fn test_unsupported_or_missing_chain() {
        let v = QueryValidator::default();
        let err = v.chain_ecosystem(&query(&[("chain", "tron")])).unwrap_err();
        assert!(err.mentions("Unsupported chain 'tron'"));
        assert!(err.mentions("binance-smart-chain"));

        let err = v.chain_ecosystem(&RawQuery::new()).unwrap_err();
        assert!(err.mentions("chain is required"));
    }

    #[test]
    fn test_non_string_values_are_rejected() {
        let v = QueryValidator::default();
        let mut raw = RawQuery::new();
        raw.insert("detail", QueryValue::Other(json!({"nested": true})));
        raw.insert("limit", QueryValue::List(vec!["1".into(), "2".into()]));
        let err = v.trending(&raw).unwrap_err();
        assert!(err.mentions("detail must be a string"));
        assert!(err.mentions("limit must be a single value"));
    }

    #[test]
    fn test_min_change_is_validated_on_movers() {
        let v = QueryValidator::default();
        let opts = v.movers(&query(&[("min_change", "2.5"), ("direction", "Losers")])).unwrap();
        assert_eq!(opts.min_change, 2.5);
        assert_eq!(opts.direction, MoverDirection::Losers);

        let checked = v.check_movers(&query(&[("minChange", "-1")]));
        assert_eq!(checked.value.min_change, 1.0);
        assert_eq!(checked.violations, vec!["minChange must be at least 0".to_string()]);
    }

    #[test]
    fn test_dispatch_by_endpoint() {
        let v = QueryValidator::default();
        let q = v.validate(Endpoint::ChainsOverview, &RawQuery::new()).unwrap();
        assert!(matches!(q, EndpointQuery::ChainsOverview(ref o) if o.limit == 25));
        assert!(v.validate(Endpoint::ChainEcosystem, &RawQuery::new()).is_err());
    }
}
