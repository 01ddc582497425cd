use harvester::{Harvester, HarvesterConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match harvester_common::config::find_config_file() {
        Ok(path) => harvester_common::config::load_config(&path)?,
        Err(_) => HarvesterConfig::default(),
    };

    Harvester::new(config).run().await
}
