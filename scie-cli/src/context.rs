//! Wires a `CoreContext` and an `EvidenceWriter` for the CLI commands from
//! the shared `--repo`/`--evidence-dir`/`--config` flags.

use scie_core::{Clock, Config, CoreContext, EvidenceSink, FsRepository, SystemClock};
use scie_evidence::EvidenceWriter;
use std::path::Path;
use std::sync::Arc;

pub fn build(repo: &Path, evidence_dir: &Path, config: Config) -> anyhow::Result<(CoreContext, Arc<EvidenceWriter>)> {
    let writer = Arc::new(EvidenceWriter::new(
        evidence_dir,
        std::time::Duration::from_secs(config.worm_lock_timeout_seconds),
    )?);
    let ctx = CoreContext::new(
        repo.to_path_buf(),
        config,
        Arc::new(SystemClock) as Arc<dyn Clock>,
        Arc::new(FsRepository::new(repo)),
        writer.clone() as Arc<dyn EvidenceSink>,
    );
    Ok((ctx, writer))
}
