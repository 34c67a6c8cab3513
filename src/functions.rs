// Standard library
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

// 3rd party crates
use futures::{stream::FuturesUnordered, StreamExt};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

// Project imports
use crate::providers::powerdns::{PowerDns, PowerDnsError};
use crate::resources::data_sources::{lookup_reverse_zone, lookup_zone};
use crate::resources::ptr_record::PtrRecordResource;
use crate::resources::record::RecordResource;
use crate::resources::recursor_config::RecursorConfigResource;
use crate::resources::recursor_forward_zone::RecursorForwardZoneResource;
use crate::resources::reverse_zone::ReverseZoneResource;
use crate::resources::zone::ZoneResource;
use crate::resources::{Outcome, Resource, ResourceError, ResourceKind};
use crate::settings::types::{ImportRequest, Lookups};
use crate::settings::{ConfigManager, Settings};

/// Counts of what one reconcile pass did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PassSummary {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub unchanged: usize,
    pub failed: usize,
}

impl PassSummary {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Created => self.created += 1,
            Outcome::Updated => self.updated += 1,
            Outcome::Deleted => self.deleted += 1,
            Outcome::Unchanged => self.unchanged += 1,
        }
    }

    fn merge(&mut self, other: PassSummary) {
        self.created += other.created;
        self.updated += other.updated;
        self.deleted += other.deleted;
        self.unchanged += other.unchanged;
        self.failed += other.failed;
    }
}

/// Main application loop.
///
/// Runs one reconcile pass, then repeats every `reconcile.interval` seconds,
/// reloading the configuration file before each pass. An interval of 0 runs
/// a single pass. Stops on the shutdown signal.
pub async fn run(
    config: Arc<ConfigManager>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), Box<dyn Error>> {
    let settings: Settings = config.snapshot().await;
    let summary = reconcile(&settings).await?;
    if summary.failed > 0 {
        warn!(failed = summary.failed, "Some declarations could not be applied");
    }

    loop {
        let interval: u64 = config.get_reconcile_interval().await;
        if interval == 0 {
            info!("Reconcile interval is 0, exiting after a single pass");
            break;
        }
        debug!("🕰️ Next reconcile pass in {} seconds", interval);

        tokio::select! {
            // Handle shutdown signal
            Ok(_) = shutdown_rx.recv() => {
                info!("Received shutdown signal, stopping reconcile loop");
                break;
            }

            _ = tokio::time::sleep(Duration::from_secs(interval)) => {
                if let Err(e) = config.reload().await {
                    warn!("Keeping previous configuration: {}", e);
                }

                let settings: Settings = config.snapshot().await;
                match reconcile(&settings).await {
                    Ok(summary) if summary.failed > 0 => {
                        warn!(failed = summary.failed, "Some declarations could not be applied");
                    }
                    Ok(_) => {}
                    Err(e) => error!("Reconcile pass aborted: {}", e),
                }
            }
        }
    }

    Ok(())
}

/// Applies every declaration in `settings`, then reports lookups and imports.
///
/// Zones are applied before the records they hold, and the recursor last.
/// Declarations within a phase run concurrently; a failed declaration is
/// logged and counted without stopping the others.
pub async fn reconcile(settings: &Settings) -> Result<PassSummary, PowerDnsError> {
    let client = PowerDns::new(&settings.powerdns).await?;
    let mut summary = PassSummary::default();

    let zones = ZoneResource::new(client.clone());
    let reverse_zones = ReverseZoneResource::new(client.clone());
    let (a, b) = futures::join!(
        apply_all(&zones, &settings.zones),
        apply_all(&reverse_zones, &settings.reverse_zones)
    );
    summary.merge(a);
    summary.merge(b);

    let records = RecordResource::new(client.clone());
    let ptr_records = PtrRecordResource::new(client.clone());
    let (a, b) = futures::join!(
        apply_all(&records, &settings.records),
        apply_all(&ptr_records, &settings.ptr_records)
    );
    summary.merge(a);
    summary.merge(b);

    let recursor_configs = RecursorConfigResource::new(client.clone());
    let forward_zones = RecursorForwardZoneResource::new(client.clone());
    let (a, b) = futures::join!(
        apply_all(&recursor_configs, &settings.recursor_configs),
        apply_all(&forward_zones, &settings.recursor_forward_zones)
    );
    summary.merge(a);
    summary.merge(b);

    info!(
        created = summary.created,
        updated = summary.updated,
        deleted = summary.deleted,
        unchanged = summary.unchanged,
        failed = summary.failed,
        "Reconcile pass finished"
    );

    report_lookups(&client, &settings.lookups).await;
    report_imports(&client, &settings.imports).await;

    Ok(summary)
}

/// Applies declarations of one resource type concurrently.
pub async fn apply_all<R: Resource>(resource: &R, specs: &[R::Spec]) -> PassSummary {
    let mut summary = PassSummary::default();
    let mut futures = FuturesUnordered::new();

    for spec in specs {
        futures.push(async move { (resource.label(spec), resource.apply(spec).await) });
    }

    while let Some((label, result)) = futures.next().await {
        match result {
            Ok(outcome) => {
                info!(
                    resource = %resource.type_name(),
                    name = %label,
                    outcome = %outcome,
                    "Declaration applied"
                );
                summary.record(outcome);
            }
            Err(e) => {
                error!(
                    resource = %resource.type_name(),
                    name = %label,
                    error = %e,
                    "Failed to apply declaration"
                );
                summary.failed += 1;
            }
        }
    }

    summary
}

/// Imports an existing object and returns its state as JSON.
pub async fn import_state<R: Resource>(resource: &R, id: &str) -> Result<Value, ResourceError> {
    let state = resource.import(id).await?;
    Ok(serde_json::to_value(state).map_err(PowerDnsError::from)?)
}

/// Resolves one import request against the matching resource type.
pub async fn import(client: &PowerDns, request: &ImportRequest) -> Result<Value, ResourceError> {
    let client = client.clone();
    match request.kind {
        ResourceKind::Zone => import_state(&ZoneResource::new(client), &request.id).await,
        ResourceKind::Record => import_state(&RecordResource::new(client), &request.id).await,
        ResourceKind::PtrRecord => {
            import_state(&PtrRecordResource::new(client), &request.id).await
        }
        ResourceKind::ReverseZone => {
            import_state(&ReverseZoneResource::new(client), &request.id).await
        }
        ResourceKind::RecursorConfig => {
            import_state(&RecursorConfigResource::new(client), &request.id).await
        }
        ResourceKind::RecursorForwardZone => {
            import_state(&RecursorForwardZoneResource::new(client), &request.id).await
        }
    }
}

async fn report_lookups(client: &PowerDns, lookups: &Lookups) {
    for cidr in &lookups.reverse_zones {
        match lookup_reverse_zone(client, cidr).await {
            Ok(zone) => info!(
                cidr = %cidr,
                zone = %zone.name,
                kind = %zone.kind,
                nameservers = ?zone.nameservers,
                "Reverse zone found"
            ),
            Err(e) => warn!(cidr = %cidr, error = %e, "Reverse zone lookup failed"),
        }
    }

    for name in &lookups.zones {
        match lookup_zone(client, name).await {
            Ok(zone) => info!(
                zone = %zone.name,
                kind = %zone.kind,
                serial = zone.serial,
                records = zone.records.len(),
                "Zone found"
            ),
            Err(e) => warn!(zone = %name, error = %e, "Zone lookup failed"),
        }
    }
}

async fn report_imports(client: &PowerDns, imports: &[ImportRequest]) {
    for request in imports {
        match import(client, request).await {
            Ok(state) => info!(
                resource = %request.kind,
                id = %request.id,
                state = %state,
                "Imported"
            ),
            Err(e) => error!(resource = %request.kind, id = %request.id, error = %e, "Import failed"),
        }
    }
}
