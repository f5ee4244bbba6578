//! Whole-ledger persistence as a JSON node-link document.
//!
//! ```json
//! { "balances": {"alice": 0, "bob": 200},
//!   "graph": { "nodes": ["alice", "bob"],
//!              "edges": [{"source": "bob", "target": "alice", "capacity": 50, "flow": 50}] } }
//! ```

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::accounts::AccountLedger;
use crate::domain::{AccountId, Error, Money, Result};
use crate::graph::{TrustEdge, TrustGraph};
use crate::ledger::Ledger;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub balances: BTreeMap<AccountId, Money>,
    pub graph: GraphData,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<AccountId>,
    pub edges: Vec<EdgeData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeData {
    pub source: AccountId,
    pub target: AccountId,
    pub capacity: Money,
    pub flow: Money,
}

pub fn encode(ledger: &Ledger) -> Snapshot {
    let balances: BTreeMap<AccountId, Money> = ledger
        .accounts()
        .iter()
        .map(|(user, balance)| (user.clone(), *balance))
        .collect();

    let mut edges: Vec<EdgeData> = ledger
        .graph()
        .edges()
        .map(|(creditor, debtor, edge)| EdgeData {
            source: creditor.clone(),
            target: debtor.clone(),
            capacity: edge.capacity,
            flow: edge.flow,
        })
        .collect();
    edges.sort_by(|a, b| (&a.source, &a.target).cmp(&(&b.source, &b.target)));

    Snapshot {
        graph: GraphData {
            nodes: balances.keys().cloned().collect(),
            edges,
        },
        balances,
    }
}

pub fn decode(snapshot: Snapshot) -> Result<Ledger> {
    let mut nodes = BTreeSet::new();
    for node in snapshot.graph.nodes {
        if !nodes.insert(node.clone()) {
            return Err(Error::Snapshot(format!("duplicate node {}", node)));
        }
    }

    let mut accounts = AccountLedger::new();
    for node in &nodes {
        accounts.insert(node.clone(), Money::ZERO);
    }
    for (user, balance) in snapshot.balances {
        if !nodes.contains(&user) {
            return Err(Error::Snapshot(format!("balance for unknown node {}", user)));
        }
        accounts.insert(user, balance);
    }

    let mut graph = TrustGraph::new();
    let mut seen = HashSet::new();
    for edge in snapshot.graph.edges {
        for end in [&edge.source, &edge.target] {
            if !nodes.contains(end) {
                return Err(Error::Snapshot(format!("edge references unknown node {}", end)));
            }
        }
        if edge.source == edge.target {
            return Err(Error::Snapshot(format!("self edge on {}", edge.source)));
        }
        if edge.flow.is_negative() || edge.flow > edge.capacity {
            return Err(Error::Snapshot(format!(
                "edge {} -> {} has flow {} outside [0, {}]",
                edge.source, edge.target, edge.flow, edge.capacity
            )));
        }
        if !seen.insert((edge.source.clone(), edge.target.clone())) {
            return Err(Error::Snapshot(format!(
                "duplicate edge {} -> {}",
                edge.source, edge.target
            )));
        }

        graph.insert_edge(
            edge.source,
            edge.target,
            TrustEdge {
                capacity: edge.capacity,
                flow: edge.flow,
            },
        );
    }

    let ledger = Ledger::from_parts(accounts, graph);
    ensure_representable(&ledger)?;
    Ok(ledger)
}

/// Rejects restored states whose totals or balances don't fit in `Money`.
fn ensure_representable(ledger: &Ledger) -> Result<()> {
    ledger
        .accounts()
        .total_value_locked()
        .and(ledger.graph().total_flow())
        .and(ledger.summaries())
        .map(|_| ())
        .map_err(|_| Error::Snapshot("balances or flows overflow".to_string()))
}

pub fn to_writer<W: Write>(ledger: &Ledger, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, &encode(ledger))?;
    Ok(())
}

pub fn from_reader<R: Read>(reader: R) -> Result<Ledger> {
    let snapshot: Snapshot = serde_json::from_reader(reader)?;
    decode(snapshot)
}

pub fn save(ledger: &Ledger, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    to_writer(ledger, &mut writer)?;
    writer.flush()?;
    info!(path = %path.display(), "snapshot saved");
    Ok(())
}

pub fn load(path: &Path) -> Result<Ledger> {
    let ledger = from_reader(BufReader::new(File::open(path)?))?;
    info!(path = %path.display(), "snapshot loaded");
    Ok(ledger)
}
