//! Fixed allow-lists and bounds shared by every endpoint validator.

/// Category tags accepted in `categories` filters (provider categories, kebab-cased).
pub const CATEGORIES: &[&str] = &[
    "dexes",
    "lending",
    "liquid-staking",
    "liquid-restaking",
    "restaking",
    "bridge",
    "cross-chain",
    "cdp",
    "yield",
    "yield-aggregator",
    "derivatives",
    "options",
    "synthetics",
    "insurance",
    "launchpad",
    "rwa",
    "staking-pool",
    "services",
    "algo-stables",
    "indexes",
    "farm",
    "leveraged-farming",
    "prediction-market",
    "nft-marketplace",
    "nft-lending",
    "payments",
    "privacy",
    "chain",
];

/// Chain names accepted in `chains` filters.
pub const CHAINS: &[&str] = &[
    "ethereum",
    "bsc",
    "polygon",
    "arbitrum",
    "optimism",
    "avalanche",
    "fantom",
    "solana",
    "base",
    "tron",
    "bifrost",
    "moonbeam",
    "moonriver",
    "kusama",
    "polkadot",
    "astar",
    "cronos",
    "gnosis",
    "linea",
    "scroll",
    "blast",
    "mantle",
    "zksync-era",
    "sui",
    "aptos",
    "near",
];

/// Chains with a dedicated ecosystem view: (canonical id, provider display name).
pub const SUPPORTED_CHAINS: &[(&str, &str)] = &[
    ("ethereum", "Ethereum"),
    ("binance-smart-chain", "BSC"),
    ("polygon", "Polygon"),
    ("arbitrum", "Arbitrum"),
    ("optimism", "Optimism"),
    ("avalanche", "Avalanche"),
    ("fantom", "Fantom"),
    ("solana", "Solana"),
    ("base", "Base"),
    ("bifrost", "Bifrost"),
];

/// Shorthand chain names mapped onto canonical ids before the supported-chain check.
pub const CHAIN_ALIASES: &[(&str, &str)] = &[
    ("eth", "ethereum"),
    ("ether", "ethereum"),
    ("mainnet", "ethereum"),
    ("bsc", "binance-smart-chain"),
    ("bnb", "binance-smart-chain"),
    ("binance", "binance-smart-chain"),
    ("matic", "polygon"),
    ("poly", "polygon"),
    ("arb", "arbitrum"),
    ("arbitrum-one", "arbitrum"),
    ("op", "optimism"),
    ("avax", "avalanche"),
    ("ftm", "fantom"),
    ("sol", "solana"),
    ("bnc", "bifrost"),
];

pub const MAX_CATEGORIES: usize = 10;
pub const MAX_CHAINS: usize = 10;
pub const MAX_TIMEFRAMES: usize = 5;

/// Upper bound for `minTvl` filters.
pub const MAX_MIN_TVL: u64 = 1_000_000_000_000;

/// Default `minTvl` for trending and movers: the engines' liquidity floor.
pub const DEFAULT_MIN_TVL: u64 = core_types::LIQUIDITY_FLOOR as u64;

/// The allow-lists a `QueryValidator` checks against.
///
/// `Default` yields the module constants; a custom set can be injected for
/// deployments that track a different universe.
#[derive(Debug, Clone, Copy)]
pub struct ValidationRules {
    pub categories: &'static [&'static str],
    pub chains: &'static [&'static str],
    pub supported_chains: &'static [(&'static str, &'static str)],
    pub chain_aliases: &'static [(&'static str, &'static str)],
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            categories: CATEGORIES,
            chains: CHAINS,
            supported_chains: SUPPORTED_CHAINS,
            chain_aliases: CHAIN_ALIASES,
        }
    }
}

impl ValidationRules {
    /// The provider's display name for a canonical supported chain id.
    pub fn provider_chain_name(&self, chain_id: &str) -> Option<&'static str> {
        self.supported_chains
            .iter()
            .find(|(id, _)| *id == chain_id)
            .map(|(_, name)| *name)
    }
}
