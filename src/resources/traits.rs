// Standard library
use std::fmt::Debug;

// 3rd party crates
use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

// Current module imports
use super::errors::ResourceError;
use super::types::{Ensure, Outcome};

/// Lifecycle of one kind of PowerDNS object.
///
/// A resource turns a declaration (`Spec`) into server state and reports
/// that state back as `State`. Every implementation must be able to derive
/// the state it expects from a declaration alone ([`planned`](Self::planned)),
/// which is what lets [`apply`](Self::apply) reconcile without a state file.
///
/// # Example Implementation
///
/// ```rust,ignore
/// struct Setting { client: PowerDns }
///
/// #[async_trait]
/// impl Resource for Setting {
///     type Spec = SettingSpec;
///     type State = SettingState;
///
///     fn type_name(&self) -> &'static str { "powerdns_setting" }
///     fn label(&self, spec: &SettingSpec) -> String { spec.name.clone() }
///     fn ensure(&self, spec: &SettingSpec) -> Ensure { spec.ensure }
///     fn planned(&self, spec: &SettingSpec) -> Result<SettingState, ResourceError> { .. }
///     async fn create(&self, spec: &SettingSpec) -> Result<SettingState, ResourceError> { .. }
///     async fn read(&self, state: &SettingState) -> Result<Option<SettingState>, ResourceError> { .. }
///     async fn update(&self, spec: &SettingSpec, current: &SettingState) -> Result<SettingState, ResourceError> { .. }
///     async fn delete(&self, state: &SettingState) -> Result<(), ResourceError> { .. }
///     async fn import(&self, id: &str) -> Result<SettingState, ResourceError> { .. }
/// }
/// ```
#[async_trait]
pub trait Resource: Send + Sync {
    /// The declaration, as written in the configuration file.
    type Spec: Clone + Debug + Send + Sync;

    /// What the server reports for the object. Equality is used to decide
    /// whether an update is needed, so list fields should be normalized.
    type State: Clone + Debug + PartialEq + Serialize + Send + Sync;

    /// Name of the resource type, e.g. `powerdns_zone`.
    fn type_name(&self) -> &'static str;

    /// Short human readable name of a declaration, used in logs.
    fn label(&self, spec: &Self::Spec) -> String;

    fn ensure(&self, spec: &Self::Spec) -> Ensure;

    /// The state the server should report once `spec` is applied.
    ///
    /// Validates the declaration; nothing is sent to the server.
    fn planned(&self, spec: &Self::Spec) -> Result<Self::State, ResourceError>;

    async fn create(&self, spec: &Self::Spec) -> Result<Self::State, ResourceError>;

    /// Reads the object identified by `state`. `Ok(None)` means it is gone.
    async fn read(&self, state: &Self::State) -> Result<Option<Self::State>, ResourceError>;

    async fn update(
        &self,
        spec: &Self::Spec,
        current: &Self::State,
    ) -> Result<Self::State, ResourceError>;

    async fn delete(&self, state: &Self::State) -> Result<(), ResourceError>;

    /// Builds the state of an existing object from its import ID.
    async fn import(&self, id: &str) -> Result<Self::State, ResourceError>;

    /// Whether `current` already satisfies `spec`.
    fn in_sync(&self, spec: &Self::Spec, current: &Self::State) -> bool {
        self.planned(spec)
            .map(|planned| &planned == current)
            .unwrap_or(false)
    }

    /// Brings the server in line with one declaration.
    async fn apply(&self, spec: &Self::Spec) -> Result<Outcome, ResourceError> {
        let planned = self.planned(spec)?;
        let current = self.read(&planned).await?;

        match (self.ensure(spec), current) {
            (Ensure::Absent, None) => Ok(Outcome::Unchanged),
            (Ensure::Absent, Some(current)) => {
                self.delete(&current).await?;
                Ok(Outcome::Deleted)
            }
            (Ensure::Present, None) => {
                self.create(spec).await?;
                Ok(Outcome::Created)
            }
            (Ensure::Present, Some(current)) if self.in_sync(spec, &current) => Ok(Outcome::Unchanged),
            (Ensure::Present, Some(current)) => {
                debug!(
                    resource = %self.type_name(),
                    planned = ?planned,
                    current = ?current,
                    "Observed state differs from declaration"
                );
                self.update(spec, &current).await?;
                Ok(Outcome::Updated)
            }
        }
    }
}
