use core_types::Protocol;

/// Category, chain and TVL-floor filter applied before any calculation.
///
/// Category and chain tags are compared in their normalized kebab-case form,
/// so "Liquid Staking" matches the tag `liquid-staking`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProtocolFilter {
    pub min_tvl: f64,
    pub categories: Option<Vec<String>>,
    pub chains: Option<Vec<String>>,
}

impl ProtocolFilter {
    pub fn new(min_tvl: f64) -> Self {
        Self {
            min_tvl,
            ..Self::default()
        }
    }

    pub fn with_categories(mut self, categories: Option<Vec<String>>) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_chains(mut self, chains: Option<Vec<String>>) -> Self {
        self.chains = chains;
        self
    }

    pub fn matches(&self, protocol: &Protocol) -> bool {
        if protocol.tvl_or_zero() < self.min_tvl {
            return false;
        }
        if let Some(categories) = &self.categories {
            if !categories.contains(&protocol.category_tag()) {
                return false;
            }
        }
        if let Some(chains) = &self.chains {
            if !protocol.matches_any_chain(chains) {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, protocols: &[Protocol]) -> Vec<Protocol> {
        protocols.iter().filter(|p| self.matches(p)).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn protocol(id: &str, tvl: f64, category: &str, chains: &[&str]) -> Protocol {
        let mut p = Protocol::new(id, id, tvl);
        p.category = Some(category.to_string());
        p.chains = chains.iter().map(|c| c.to_string()).collect();
        p
    }

    #[test]
    fn test_filters_combine() {
        let protocols = vec![
            protocol("aave", 10e9, "Lending", &["Ethereum", "Polygon"]),
            protocol("lido", 20e9, "Liquid Staking", &["Ethereum"]),
            protocol("tiny", 5e5, "Lending", &["Ethereum"]),
            protocol("gmx", 5e8, "Derivatives", &["Arbitrum"]),
        ];

        let filter = ProtocolFilter::new(1e6)
            .with_categories(Some(vec!["lending".into(), "liquid-staking".into()]))
            .with_chains(Some(vec!["ethereum".into()]));
        let ids: Vec<String> = filter.apply(&protocols).into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["aave", "lido"]);
    }

    #[test]
    fn test_default_filter_keeps_everything() {
        let protocols = vec![Protocol::new("a", "A", 0.0), Protocol::new("b", "B", 1.0)];
        assert_eq!(ProtocolFilter::default().apply(&protocols).len(), 2);
    }
}
