use crate::engine::safe_div;
use crate::report::{DominanceEntry, GroupDominanceEntry};
use core_types::{Chain, Protocol};
use std::collections::HashMap;

/// Per-protocol share of total TVL, largest first.
///
/// Only protocols with a positive TVL take part. Returns an empty table when
/// the total is zero.
pub fn protocol_dominance(protocols: &[Protocol]) -> Vec<DominanceEntry> {
    let mut positive: Vec<&Protocol> = protocols.iter().filter(|p| p.tvl_or_zero() > 0.0).collect();
    let total: f64 = positive.iter().map(|p| p.tvl_or_zero()).sum();
    if total <= 0.0 {
        return Vec::new();
    }
    positive.sort_by(|a, b| b.tvl_or_zero().total_cmp(&a.tvl_or_zero()));

    positive
        .into_iter()
        .map(|p| DominanceEntry {
            id: p.id.clone(),
            name: p.name.clone(),
            tvl: p.tvl_or_zero(),
            dominance_percentage: p.tvl_or_zero() / total * 100.0,
            category: p.category_or_default().to_string(),
            chain_count: p.chains.len(),
        })
        .collect()
}

/// TVL grouped by category ("Other" when absent).
pub fn category_dominance(protocols: &[Protocol]) -> Vec<GroupDominanceEntry> {
    group_dominance(protocols, |p| p.category_or_default().to_string())
}

/// TVL grouped by primary chain ("Multi-Chain" when the protocol spans several).
pub fn chain_dominance(protocols: &[Protocol]) -> Vec<GroupDominanceEntry> {
    group_dominance(protocols, |p| p.chain_group().to_string())
}

/// Dominance computed straight from the provider's chain records.
pub fn chain_table_dominance(chains: &[Chain]) -> Vec<GroupDominanceEntry> {
    let mut positive: Vec<&Chain> = chains.iter().filter(|c| c.tvl_or_zero() > 0.0).collect();
    let total: f64 = positive.iter().map(|c| c.tvl_or_zero()).sum();
    if total <= 0.0 {
        return Vec::new();
    }
    positive.sort_by(|a, b| b.tvl_or_zero().total_cmp(&a.tvl_or_zero()));

    positive
        .into_iter()
        .map(|c| GroupDominanceEntry {
            name: c.name.clone(),
            tvl: c.tvl_or_zero(),
            dominance_percentage: c.tvl_or_zero() / total * 100.0,
            protocol_count: c.protocols,
            average_tvl_per_protocol: safe_div(c.tvl_or_zero(), c.protocols as f64),
        })
        .collect()
}

fn group_dominance<F>(protocols: &[Protocol], key: F) -> Vec<GroupDominanceEntry>
where
    F: Fn(&Protocol) -> String,
{
    let mut groups: HashMap<String, (f64, usize)> = HashMap::new();
    for protocol in protocols.iter().filter(|p| p.tvl_or_zero() > 0.0) {
        let slot = groups.entry(key(protocol)).or_insert((0.0, 0));
        slot.0 += protocol.tvl_or_zero();
        slot.1 += 1;
    }

    let total: f64 = groups.values().map(|(tvl, _)| tvl).sum();
    if total <= 0.0 {
        return Vec::new();
    }

    let mut entries: Vec<GroupDominanceEntry> = groups
        .into_iter()
        .map(|(name, (tvl, count))| GroupDominanceEntry {
            name,
            tvl,
            dominance_percentage: tvl / total * 100.0,
            protocol_count: count,
            average_tvl_per_protocol: safe_div(tvl, count as f64),
        })
        .collect();
    // Name as tie-breaker keeps HashMap iteration order out of the output.
    entries.sort_by(|a, b| b.tvl.total_cmp(&a.tvl).then_with(|| a.name.cmp(&b.name)));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn protocol(id: &str, tvl: f64, category: Option<&str>, chains: &[&str]) -> Protocol {
        let mut p = Protocol::new(id, id.to_uppercase(), tvl);
        p.category = category.map(str::to_string);
        p.chains = chains.iter().map(|c| c.to_string()).collect();
        p
    }

    #[test]
    fn test_protocol_dominance_shares() {
        let protocols = vec![
            protocol("b", 300.0, Some("Dexes"), &["Ethereum"]),
            protocol("a", 600.0, Some("Lending"), &["Ethereum"]),
            protocol("c", 100.0, None, &[]),
            protocol("zero", 0.0, None, &[]),
        ];
        let table = protocol_dominance(&protocols);

        let ids: Vec<&str> = table.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!((table[0].dominance_percentage - 60.0).abs() < 1e-9);
        assert!((table[1].dominance_percentage - 30.0).abs() < 1e-9);
        assert!((table[2].dominance_percentage - 10.0).abs() < 1e-9);
        assert_eq!(table[2].category, "Other");
    }

    #[test]
    fn test_zero_total_yields_empty_table() {
        let protocols = vec![protocol("a", 0.0, None, &[]), Protocol {
            tvl: None,
            ..Protocol::new("b", "B", 0.0)
        }];
        assert!(protocol_dominance(&protocols).is_empty());
        assert!(category_dominance(&protocols).is_empty());
        assert!(protocol_dominance(&[]).is_empty());
    }

    #[test]
    fn test_category_dominance_groups_and_averages() {
        let protocols = vec![
            protocol("a", 600.0, Some("Lending"), &["Ethereum"]),
            protocol("b", 200.0, Some("Lending"), &["Ethereum"]),
            protocol("c", 200.0, None, &["Ethereum", "Arbitrum"]),
        ];
        let table = category_dominance(&protocols);

        assert_eq!(table.len(), 2);
        assert_eq!(table[0].name, "Lending");
        assert_eq!(table[0].protocol_count, 2);
        assert!((table[0].dominance_percentage - 80.0).abs() < 1e-9);
        assert!((table[0].average_tvl_per_protocol - 400.0).abs() < 1e-9);
        assert_eq!(table[1].name, "Other");

        let chains = chain_dominance(&protocols);
        assert_eq!(chains[0].name, "Ethereum");
        assert_eq!(chains[1].name, "Multi-Chain");
    }

    #[test]
    fn test_chain_table_dominance() {
        let chains = vec![
            Chain::new("Tron", 25.0, 0),
            Chain::new("Ethereum", 75.0, 3),
            Chain::new("Dead", 0.0, 1),
        ];
        let table = chain_table_dominance(&chains);
        assert_eq!(table.len(), 2);
        assert_eq!(table[0].name, "Ethereum");
        assert!((table[0].average_tvl_per_protocol - 25.0).abs() < 1e-9);
        assert_eq!(table[1].average_tvl_per_protocol, 0.0);
    }

    /// Deterministic protocol sets with TVLs spanning many orders of magnitude,
    /// some zero, spread over a handful of categories and chains.
    fn generated_market(seed: u64, size: usize) -> (Vec<Protocol>, Vec<Chain>) {
        const CATEGORIES: [Option<&str>; 4] = [Some("Lending"), Some("Dexes"), Some("Bridge"), None];
        const CHAINS: [&str; 4] = ["Ethereum", "Solana", "Arbitrum", "Base"];

        let mut state = seed;
        let mut next = move || {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            state >> 33
        };

        let protocols = (0..size)
            .map(|i| {
                let roll = next();
                let tvl = if roll % 7 == 0 {
                    0.0
                } else {
                    (roll % 10_000) as f64 * 10f64.powi((roll % 8) as i32)
                };
                let chain_count = 1 + (roll as usize / 3) % 2;
                let chains: Vec<&str> = (0..chain_count).map(|k| CHAINS[(i + k) % CHAINS.len()]).collect();
                protocol(&format!("p{i}"), tvl, CATEGORIES[i % CATEGORIES.len()], &chains)
            })
            .collect();
        let chains = CHAINS
            .iter()
            .map(|name| Chain::new(*name, (next() % 1_000_000) as f64 * 1e3, 0))
            .collect();
        (protocols, chains)
    }

    #[test]
    fn test_every_table_sums_to_one_hundred() {
        let sum = |shares: Vec<f64>| shares.iter().sum::<f64>();

        for seed in 1..=25u64 {
            for size in [1, 2, 7, 40, 250] {
                let (protocols, chains) = generated_market(seed, size);
                let has_tvl = protocols.iter().any(|p| p.tvl_or_zero() > 0.0);

                let tables: [Vec<f64>; 3] = [
                    protocol_dominance(&protocols).iter().map(|e| e.dominance_percentage).collect(),
                    category_dominance(&protocols).iter().map(|e| e.dominance_percentage).collect(),
                    chain_dominance(&protocols).iter().map(|e| e.dominance_percentage).collect(),
                ];
                for shares in tables {
                    if has_tvl {
                        assert!((sum(shares) - 100.0).abs() < 1e-9, "seed {seed}, size {size}");
                    } else {
                        assert!(shares.is_empty());
                    }
                }

                let chain_shares: Vec<f64> =
                    chain_table_dominance(&chains).iter().map(|e| e.dominance_percentage).collect();
                if chains.iter().any(|c| c.tvl_or_zero() > 0.0) {
                    assert!((sum(chain_shares) - 100.0).abs() < 1e-9, "seed {seed}");
                }
            }
        }
    }
}
