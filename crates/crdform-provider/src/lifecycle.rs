//! Resource lifecycle operations
//!
//! [`Provider`] combines the resource catalog, a state store and a source of
//! freshness markers. [`Provider::resource`] binds one resource kind and
//! exposes create, read, update and delete for it:
//!
//! ```ignore
//! let catalog = ResourceCatalog::builtin()?;
//! let provider = Provider::new(catalog, MemoryStore::new(), SystemClock::new());
//! let config_maps = provider.resource("k8s_config_map_v1_manifest")?;
//! let state = config_maps.create("k8s_config_map_v1_manifest.settings", &config)?;
//! ```
//!
//! Create and update map and assemble before touching the store, so a
//! failure leaves recorded state as it was. Read and delete never map.

use crdform_core::{
    ConfigValue, Manifest, ManifestIdentity, ResourceSchema, ValidationResult, assemble,
    map_resource, validate_config,
};
use tracing::{debug, info};

use crate::catalog::ResourceCatalog;
use crate::clock::{IdSource, SystemClock};
use crate::diff::{DiffEngine, Plan};
use crate::error::{ProviderError, Result};
use crate::state::ResourceState;
use crate::storage::StateStore;

/// Lifecycle entry points for every resource kind in a catalog
pub struct Provider<S: StateStore, C: IdSource = SystemClock> {
    /// Resource kinds by type name
    catalog: ResourceCatalog,

    /// Storage driver
    store: S,

    /// Freshness marker source
    ids: C,

    /// Diff engine
    diff_engine: DiffEngine,
}

impl<S: StateStore, C: IdSource> Provider<S, C> {
    /// Create a provider over the given catalog, store and id source
    pub fn new(catalog: ResourceCatalog, store: S, ids: C) -> Self {
        Self {
            catalog,
            store,
            ids,
            diff_engine: DiffEngine::new(),
        }
    }

    /// Replace the diff engine, e.g. to change the context width
    pub fn with_diff_engine(mut self, diff_engine: DiffEngine) -> Self {
        self.diff_engine = diff_engine;
        self
    }

    pub fn catalog(&self) -> &ResourceCatalog {
        &self.catalog
    }

    /// Get the storage driver
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Bind the operations for one resource type
    pub fn resource(&self, type_name: &str) -> Result<ResourceHandle<'_, S, C>> {
        let schema = self.catalog.get(type_name)?;
        Ok(ResourceHandle {
            provider: self,
            type_name: type_name.to_string(),
            schema,
        })
    }

    /// Look up recorded state without knowing its type
    pub fn show(&self, address: &str) -> Result<ResourceState> {
        self.store.get(address)
    }

    /// All recorded states
    pub fn list(&self) -> Result<Vec<ResourceState>> {
        self.store.list()
    }
}

/// Lifecycle operations bound to a single resource type
pub struct ResourceHandle<'p, S: StateStore, C: IdSource> {
    provider: &'p Provider<S, C>,
    type_name: String,
    schema: &'p ResourceSchema,
}

impl<S: StateStore, C: IdSource> ResourceHandle<'_, S, C> {
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn schema(&self) -> &ResourceSchema {
        self.schema
    }

    // ========== Bridge ==========

    /// Map and assemble without touching state
    pub fn render(&self, config: &ConfigValue) -> Result<Manifest> {
        let tree = map_resource(self.schema, config)?;
        let manifest = assemble(&tree, &ManifestIdentity::of(self.schema))?;
        debug!(type_name = %self.type_name, bytes = manifest.as_bytes().len(), "rendered manifest");
        Ok(manifest)
    }

    /// Collect every problem in `config`
    pub fn validate(&self, config: &ConfigValue) -> ValidationResult {
        validate_config(self.schema, config)
    }

    // ========== Create ==========

    /// Render `config` and record it as a new resource at `address`
    pub fn create(&self, address: &str, config: &ConfigValue) -> Result<ResourceState> {
        let manifest = self.render(config)?;
        let id = self.provider.ids.next_id();
        let state = ResourceState::for_create(
            address,
            id,
            &self.type_name,
            &self.schema.kind,
            self.schema.api_version(),
            manifest,
        );

        self.provider.store.create(&state)?;
        info!(address, id = %state.id, kind = %state.kind, "created resource");
        Ok(state)
    }

    // ========== Read ==========

    /// Recorded state, unchanged
    pub fn read(&self, address: &str) -> Result<ResourceState> {
        let state = self.provider.store.get(address)?;
        self.check_type(&state)?;
        Ok(state)
    }

    // ========== Update ==========

    /// Re-render `config` in full and replace the recorded state
    ///
    /// A new freshness marker is issued even when the manifest is unchanged.
    pub fn update(&self, address: &str, config: &ConfigValue) -> Result<ResourceState> {
        let previous = self.read(address)?;
        let manifest = self.render(config)?;
        let id = self.provider.ids.next_id();
        let state = ResourceState::for_update(&previous, id, manifest);

        self.provider.store.update(&state)?;
        info!(address, id = %state.id, revision = state.revision, "updated resource");
        Ok(state)
    }

    // ========== Delete ==========

    /// Remove the recorded state, returning it
    pub fn delete(&self, address: &str) -> Result<ResourceState> {
        self.read(address)?;
        let state = self.provider.store.delete(address)?;
        info!(address, kind = %state.kind, "deleted resource");
        Ok(state)
    }

    // ========== Plan / Apply ==========

    /// Compare the manifest for `config` with what is recorded at `address`
    pub fn plan(&self, address: &str, config: &ConfigValue) -> Result<Plan> {
        let manifest = self.render(config)?;
        let recorded = self.recorded(address)?;
        Ok(self
            .provider
            .diff_engine
            .plan(recorded.as_ref(), manifest.as_str()))
    }

    /// Create or update as needed; unchanged resources keep their state
    pub fn apply(&self, address: &str, config: &ConfigValue) -> Result<(Plan, ResourceState)> {
        let plan = self.plan(address, config)?;
        let state = match &plan {
            Plan::Create { .. } => self.create(address, config)?,
            Plan::Update { .. } => self.update(address, config)?,
            Plan::NoChange => self.read(address)?,
        };
        Ok((plan, state))
    }

    fn recorded(&self, address: &str) -> Result<Option<ResourceState>> {
        match self.read(address) {
            Ok(state) => Ok(Some(state)),
            Err(ProviderError::ResourceNotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn check_type(&self, state: &ResourceState) -> Result<()> {
        if state.type_name != self.type_name {
            return Err(ProviderError::TypeMismatch {
                address: state.address.clone(),
                stored: state.type_name.clone(),
                requested: self.type_name.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{FreshnessMarker, SequenceIds};
    use crate::storage::MemoryStore;

    const CONFIG_MAP: &str = "k8s_config_map_v1_manifest";
    const CERTIFICATE: &str = "k8s_cert_manager_io_certificate_v1_manifest";

    fn provider() -> Provider<MemoryStore, SequenceIds> {
        Provider::new(
            ResourceCatalog::builtin().unwrap(),
            MemoryStore::new(),
            SequenceIds::starting_at(10),
        )
    }

    fn config_map(name: &str, data: &[(&str, &str)]) -> ConfigValue {
        ConfigValue::object([
            ("metadata", ConfigValue::object([("name", name.into())])),
            (
                "data",
                ConfigValue::map(data.iter().map(|(k, v)| (*k, ConfigValue::from(*v)))),
            ),
        ])
    }

    #[test]
    fn test_create_records_state() {
        let provider = provider();
        let resource = provider.resource(CONFIG_MAP).unwrap();

        let state = resource
            .create("settings", &config_map("settings", &[("mode", "fast")]))
            .unwrap();

        assert_eq!(state.id, FreshnessMarker::new(10));
        assert_eq!(state.kind, "ConfigMap");
        assert_eq!(state.api_version, "v1");
        assert_eq!(
            state.yaml,
            "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: settings\ndata:\n  mode: fast\n"
        );
        assert_eq!(provider.store().get("settings").unwrap(), state);
    }

    #[test]
    fn test_create_failure_leaves_store_untouched() {
        let provider = provider();
        let resource = provider.resource(CONFIG_MAP).unwrap();

        let bad = ConfigValue::object([("metadata", ConfigValue::from("not an object"))]);
        let err = resource.create("settings", &bad).unwrap_err();

        assert!(err.is_contract_violation());
        assert!(provider.store().is_empty());
        assert_eq!(provider.store().operation_counts().writes(), 0);
    }

    #[test]
    fn test_create_existing_address_fails() {
        let provider = provider();
        let resource = provider.resource(CONFIG_MAP).unwrap();
        resource.create("a", &config_map("a", &[])).unwrap();

        let err = resource.create("a", &config_map("b", &[])).unwrap_err();
        assert!(matches!(err, ProviderError::ResourceAlreadyExists { .. }));
    }

    #[test]
    fn test_update_issues_new_id() {
        let provider = provider();
        let resource = provider.resource(CONFIG_MAP).unwrap();
        let config = config_map("a", &[("k", "v")]);

        let first = resource.create("a", &config).unwrap();
        let second = resource.update("a", &config).unwrap();

        assert!(second.id > first.id);
        assert_eq!(second.yaml, first.yaml);
        assert_eq!(second.revision, 2);
        assert_eq!(second.created_at, first.created_at);
    }

    #[test]
    fn test_update_missing_resource() {
        let provider = provider();
        let resource = provider.resource(CONFIG_MAP).unwrap();
        let err = resource.update("a", &config_map("a", &[])).unwrap_err();
        assert!(matches!(err, ProviderError::ResourceNotFound { .. }));
    }

    #[test]
    fn test_read_and_delete_do_not_render() {
        let provider = provider();
        let resource = provider.resource(CONFIG_MAP).unwrap();
        let created = resource.create("a", &config_map("a", &[])).unwrap();

        assert_eq!(resource.read("a").unwrap(), created);
        let deleted = resource.delete("a").unwrap();
        assert_eq!(deleted, created);
        assert!(provider.store().is_empty());
    }

    #[test]
    fn test_type_mismatch() {
        let provider = provider();
        provider
            .resource(CONFIG_MAP)
            .unwrap()
            .create("a", &config_map("a", &[]))
            .unwrap();

        let certificates = provider.resource(CERTIFICATE).unwrap();
        let err = certificates.read("a").unwrap_err();
        assert!(matches!(err, ProviderError::TypeMismatch { .. }));
        assert!(certificates.delete("a").is_err());
        assert_eq!(provider.store().len(), 1);
    }

    #[test]
    fn test_plan_and_apply() {
        let provider = provider();
        let resource = provider.resource(CONFIG_MAP).unwrap();
        let config = config_map("a", &[("k", "v")]);

        let (plan, created) = resource.apply("a", &config).unwrap();
        assert!(matches!(plan, Plan::Create { .. }));

        let (plan, unchanged) = resource.apply("a", &config).unwrap();
        assert_eq!(plan, Plan::NoChange);
        assert_eq!(unchanged.id, created.id);

        let changed = config_map("a", &[("k", "w")]);
        let (plan, updated) = resource.apply("a", &changed).unwrap();
        assert_eq!(plan.summary(), "update (+1 -1)");
        assert!(updated.id > created.id);
    }

    #[test]
    fn test_unknown_resource_type() {
        let provider = provider();
        assert!(matches!(
            provider.resource("k8s_nothing_v1_manifest"),
            Err(ProviderError::UnknownResourceType { .. })
        ));
    }

    #[test]
    fn test_validate_reports_missing_required() {
        let provider = provider();
        let resource = provider.resource(CERTIFICATE).unwrap();
        let config =
            ConfigValue::object([("metadata", ConfigValue::object([("name", "tls".into())]))]);

        let result = resource.validate(&config);
        assert!(!result.is_valid);
        assert_eq!(result.errors[0].path, "spec");
    }
}
