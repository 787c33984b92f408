//! A fully built data source: every network of one ingested batch.

use hashbrown::HashMap;
use tracing::info;

use super::{DataSourceRecord, Network};

/// One ingested data source, keyed by the batch identifier it arrived under,
/// holding a built [`Network`] per named network.
#[derive(Debug, Clone)]
pub struct DataSource {
    pub batch: String,
    pub name: String,
    networks: HashMap<String, Network>,
}

impl DataSource {
    /// Build every network of the record.
    pub fn build(record: DataSourceRecord) -> Self {
        let DataSourceRecord { batch, name, networks } = record;

        let networks: HashMap<String, Network> = networks
            .into_iter()
            .map(|(net_name, net_record)| {
                let built = Network::build(net_name.clone(), net_record);
                (net_name, built)
            })
            .collect();

        info!(batch = %batch, source = %name, networks = networks.len(), "data source built");

        Self { batch, name, networks }
    }

    pub fn network(&self, name: &str) -> Option<&Network> {
        self.networks.get(name)
    }

    pub fn networks(&self) -> impl Iterator<Item = &Network> {
        self.networks.values()
    }
}
