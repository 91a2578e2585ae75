//! Shared planning environment and plan node definitions for planwire
//! integration tests.
//!
//! The environment here is deliberately small: a type factory that interns
//! data types, a catalog with a handful of operators and tables, and a
//! plugin registry that can be extended at runtime.

#![allow(missing_docs)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_const_for_fn)]

use std::{
    collections::HashMap,
    fmt::Write as _,
    io,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use parking_lot::{Mutex, RwLock};
use planwire::{
    BoxError, Builder, CatalogResolver, DataType, DataTypeRef, Engine,
    Identifiable, Operator, OperatorRef, Payload, PlanEnvironment, PlanTrait,
    PluginRef, PluginRegistry, StoragePlugin, Table, TableRef,
    TypeDescription, TypeFactory, TypeKind, Writable,
};

// ============================================================================
// Type Factory
// ============================================================================

/// The largest decimal precision the test factory accepts.
pub const MAX_DECIMAL_PRECISION: u32 = 38;

#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
    #[error("decimal precision {0} exceeds {max}", max = MAX_DECIMAL_PRECISION)]
    PrecisionTooLarge(u32),

    #[error("decimal scale {scale} exceeds precision {precision}")]
    ScaleTooLarge { precision: u32, scale: u32 },
}

/// A data type handed out by [`TestTypeFactory`].
#[derive(Debug, PartialEq, Eq)]
pub struct SqlType {
    description: TypeDescription,
}

impl DataType for SqlType {
    fn describe(&self) -> TypeDescription { self.description.clone() }
}

/// Interns data types: equal descriptions yield the same allocation.
#[derive(Debug, Default)]
pub struct TestTypeFactory {
    interned: Mutex<HashMap<TypeDescription, Arc<SqlType>>>,
    created: AtomicUsize,
}

impl TestTypeFactory {
    /// The number of distinct types created so far.
    pub fn created(&self) -> usize { self.created.load(Ordering::SeqCst) }

    fn validate(description: &TypeDescription) -> Result<(), FactoryError> {
        if description.kind != TypeKind::Decimal {
            return Ok(());
        }

        let precision = description.precision.unwrap_or(0);
        let scale = description.scale.unwrap_or(0);

        if precision > MAX_DECIMAL_PRECISION {
            return Err(FactoryError::PrecisionTooLarge(precision));
        }
        if scale > precision {
            return Err(FactoryError::ScaleTooLarge { precision, scale });
        }

        Ok(())
    }

    /// Creates the type or returns the interned one.
    pub fn sql_type(
        &self,
        description: &TypeDescription,
    ) -> Result<Arc<SqlType>, FactoryError> {
        Self::validate(description)?;

        let mut interned = self.interned.lock();
        let sql_type = interned.entry(description.clone()).or_insert_with(|| {
            self.created.fetch_add(1, Ordering::SeqCst);
            Arc::new(SqlType { description: description.clone() })
        });

        Ok(Arc::clone(sql_type))
    }
}

impl TypeFactory for TestTypeFactory {
    fn create(
        &self,
        description: &TypeDescription,
    ) -> Result<Arc<dyn DataType>, BoxError> {
        Ok(self.sql_type(description)?)
    }
}

// ============================================================================
// Cluster
// ============================================================================

/// A planning cluster, identified by name in test output.
#[derive(Debug)]
pub struct TestCluster {
    pub name: String,
    factory: TestTypeFactory,
}

impl TestCluster {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), factory: TestTypeFactory::default() }
    }

    pub fn factory(&self) -> &TestTypeFactory { &self.factory }
}

impl PlanEnvironment for TestCluster {
    fn type_factory(&self) -> &dyn TypeFactory { &self.factory }
}

// ============================================================================
// Catalog
// ============================================================================

#[derive(Debug)]
pub struct SqlOperator {
    pub name: String,
}

impl Operator for SqlOperator {
    fn name(&self) -> &str { &self.name }
}

#[derive(Debug)]
pub struct CatalogTable {
    pub path: Vec<String>,
    pub row_count: u64,
}

impl Table for CatalogTable {
    fn qualified_name(&self) -> &[String] { &self.path }
}

/// Operators and tables, keyed by name and path.
#[derive(Debug, Default)]
pub struct TestCatalog {
    operators: HashMap<String, Arc<SqlOperator>>,
    tables: HashMap<Vec<String>, Arc<CatalogTable>>,
}

impl TestCatalog {
    /// Comparison and boolean operators plus the tables `sales.orders` and
    /// `sales.customers`.
    pub fn standard() -> Self {
        let mut catalog = Self::default();

        for name in ["=", "<>", "<", ">", "AND", "OR", "NOT", "+", "*"] {
            catalog.add_operator(name);
        }
        catalog.add_table(&["sales", "orders"], 1_000_000);
        catalog.add_table(&["sales", "customers"], 20_000);

        catalog
    }

    pub fn add_operator(&mut self, name: &str) {
        self.operators.insert(
            name.to_owned(),
            Arc::new(SqlOperator { name: name.to_owned() }),
        );
    }

    pub fn add_table(&mut self, path: &[&str], row_count: u64) {
        let path: Vec<String> = path.iter().map(|&s| s.to_owned()).collect();
        self.tables.insert(
            path.clone(),
            Arc::new(CatalogTable { path, row_count }),
        );
    }

    pub fn operator(&self, name: &str) -> OperatorRef {
        OperatorRef::new(
            self.lookup_operator(name).expect("operator is in the catalog"),
        )
    }

    pub fn table(&self, path: &[&str]) -> TableRef {
        let path: Vec<String> = path.iter().map(|&s| s.to_owned()).collect();
        let table = self.resolve_table(&path).expect("table is in the catalog");
        TableRef::new(table)
    }
}

impl CatalogResolver for TestCatalog {
    fn lookup_operator(&self, name: &str) -> Option<Arc<dyn Operator>> {
        self.operators
            .get(name)
            .map(|operator| Arc::clone(operator) as Arc<dyn Operator>)
    }

    fn resolve_table(&self, path: &[String]) -> Option<Arc<dyn Table>> {
        self.tables.get(path).map(|table| Arc::clone(table) as Arc<dyn Table>)
    }
}

// ============================================================================
// Plugin Registry
// ============================================================================

#[derive(Debug)]
pub struct NamedPlugin {
    pub name: String,
}

impl StoragePlugin for NamedPlugin {
    fn name(&self) -> &str { &self.name }
}

/// Plugins can be registered while engines using the registry are live.
#[derive(Debug, Default)]
pub struct TestPluginRegistry {
    plugins: RwLock<HashMap<String, Arc<NamedPlugin>>>,
}

impl TestPluginRegistry {
    pub fn with_plugins(names: &[&str]) -> Self {
        let registry = Self::default();
        for name in names {
            registry.register(name);
        }
        registry
    }

    pub fn register(&self, name: &str) -> PluginRef {
        let mut plugins = self.plugins.write();
        let plugin = plugins.entry(name.to_owned()).or_insert_with(|| {
            Arc::new(NamedPlugin { name: name.to_owned() })
        });

        PluginRef::new(Arc::clone(plugin) as Arc<dyn StoragePlugin>)
    }

    pub fn unregister(&self, name: &str) { self.plugins.write().remove(name); }
}

impl PluginRegistry for TestPluginRegistry {
    fn plugin(&self, name: &str) -> Option<Arc<dyn StoragePlugin>> {
        self.plugins
            .read()
            .get(name)
            .map(|plugin| Arc::clone(plugin) as Arc<dyn StoragePlugin>)
    }
}

// ============================================================================
// Environment
// ============================================================================

/// One planning environment: a cluster, a catalog and a plugin registry.
#[derive(Debug, Clone)]
pub struct TestEnvironment {
    pub cluster: Arc<TestCluster>,
    pub catalog: Arc<TestCatalog>,
    pub plugins: Arc<TestPluginRegistry>,
}

impl TestEnvironment {
    /// A cluster named `name` over the standard catalog with the `dfs` and
    /// `jdbc` plugins.
    pub fn new(name: &str) -> Self {
        Self {
            cluster: Arc::new(TestCluster::new(name)),
            catalog: Arc::new(TestCatalog::standard()),
            plugins: Arc::new(TestPluginRegistry::with_plugins(&[
                "dfs", "jdbc",
            ])),
        }
    }

    pub fn cluster(&self) -> Arc<dyn PlanEnvironment> {
        Arc::clone(&self.cluster) as Arc<dyn PlanEnvironment>
    }

    pub fn builder(&self) -> Builder {
        Builder::new(
            self.cluster(),
            Arc::clone(&self.catalog) as Arc<dyn CatalogResolver>,
            Arc::clone(&self.plugins) as Arc<dyn PluginRegistry>,
        )
    }

    pub fn engine(&self) -> Engine {
        self.builder().build().expect("default engine builds")
    }

    pub fn data_type(&self, description: &TypeDescription) -> DataTypeRef {
        DataTypeRef::new(
            self.cluster
                .factory()
                .sql_type(description)
                .expect("valid test type"),
        )
    }

    pub fn decimal(&self, precision: u32, scale: u32) -> DataTypeRef {
        self.data_type(&TypeDescription::decimal(precision, scale))
    }

    pub fn plugin(&self, name: &str) -> PluginRef {
        PluginRef::new(self.plugins.plugin(name).expect("plugin is registered"))
    }
}

// ============================================================================
// Plan Nodes
// ============================================================================

#[derive(Debug, Clone, PartialEq, Identifiable, Payload)]
pub enum Literal {
    Null,
    Boolean(bool),
    Integer(i64),
    Decimal { unscaled: i128, scale: u32 },
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Identifiable, Payload)]
pub enum Expression {
    InputRef(u32),
    Literal(Literal),
    Call {
        operator: OperatorRef,
        operands: Vec<Expression>,
        return_type: DataTypeRef,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Identifiable, Payload)]
pub enum JoinKind {
    Inner,
    Left,
    Full,
}

#[derive(Debug, Identifiable, Payload)]
pub struct Scan {
    pub cluster: Arc<dyn PlanEnvironment>,
    pub table: TableRef,
    pub plugin: PluginRef,
    pub row_type: DataTypeRef,
    pub traits: Vec<PlanTrait>,
}

#[derive(Debug, Identifiable, Payload)]
pub struct Filter {
    pub cluster: Arc<dyn PlanEnvironment>,
    pub input: Arc<PlanNode>,
    pub condition: Expression,
    pub statistics: Option<Statistics>,
}

#[derive(Debug, Identifiable, Payload)]
pub struct Project {
    pub cluster: Arc<dyn PlanEnvironment>,
    pub input: Arc<PlanNode>,
    pub expressions: Vec<Expression>,
    pub row_type: DataTypeRef,
    #[payload(skip)]
    pub explained: Option<String>,
}

#[derive(Debug, Identifiable, Payload)]
pub struct Join {
    pub cluster: Arc<dyn PlanEnvironment>,
    pub left: Arc<PlanNode>,
    pub right: Arc<PlanNode>,
    pub condition: Expression,
    pub kind: JoinKind,
}

#[derive(Debug, Identifiable, Payload)]
pub enum PlanNode {
    Scan(Scan),
    Filter(Filter),
    Project(Project),
    Join(Join),
}

impl PlanNode {
    /// The cluster the node was planned in.
    pub fn cluster(&self) -> &Arc<dyn PlanEnvironment> {
        match self {
            Self::Scan(scan) => &scan.cluster,
            Self::Filter(filter) => &filter.cluster,
            Self::Project(project) => &project.cluster,
            Self::Join(join) => &join.cluster,
        }
    }

    /// The direct inputs of the node.
    pub fn inputs(&self) -> Vec<&Arc<Self>> {
        match self {
            Self::Scan(_) => Vec::new(),
            Self::Filter(Filter { input, .. })
            | Self::Project(Project { input, .. }) => vec![input],
            Self::Join(join) => vec![&join.left, &join.right],
        }
    }

    /// Renders the plan as an indented tree, one node per line.
    ///
    /// Two plans explain the same iff they are equal up to environment
    /// binding.
    pub fn explain(&self) -> String {
        let mut out = String::new();
        self.explain_into(&mut out, 0);
        out
    }

    fn explain_into(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);

        let _ = match self {
            Self::Scan(scan) => writeln!(
                out,
                "{indent}Scan({}, plugin={}, type={}, traits={:?})",
                scan.table.qualified_name().join("."),
                scan.plugin.name(),
                scan.row_type.describe(),
                scan.traits,
            ),
            Self::Filter(filter) => writeln!(
                out,
                "{indent}Filter({}, stats={:?})",
                explain_expression(&filter.condition),
                filter.statistics,
            ),
            Self::Project(project) => writeln!(
                out,
                "{indent}Project([{}], type={})",
                project
                    .expressions
                    .iter()
                    .map(explain_expression)
                    .collect::<Vec<_>>()
                    .join(", "),
                project.row_type.describe(),
            ),
            Self::Join(join) => writeln!(
                out,
                "{indent}Join({:?}, {})",
                join.kind,
                explain_expression(&join.condition),
            ),
        };

        for input in self.inputs() {
            input.explain_into(out, depth + 1);
        }
    }
}

fn explain_expression(expression: &Expression) -> String {
    match expression {
        Expression::InputRef(index) => format!("${index}"),
        Expression::Literal(literal) => format!("{literal:?}"),
        Expression::Call { operator, operands, return_type } => format!(
            "{}({}): {}",
            operator.name(),
            operands
                .iter()
                .map(explain_expression)
                .collect::<Vec<_>>()
                .join(", "),
            return_type.describe(),
        ),
    }
}

// ============================================================================
// Writable Statistics
// ============================================================================

/// Row statistics with their own fixed-width big-endian native form.
#[derive(Debug, Clone, Copy, PartialEq, Identifiable, Payload)]
#[payload(writable)]
pub struct Statistics {
    pub row_count: f64,
    pub distinct_keys: u64,
}

impl Writable for Statistics {
    fn write_native(&self, out: &mut Vec<u8>) -> io::Result<()> {
        out.extend_from_slice(&self.row_count.to_be_bytes());
        out.extend_from_slice(&self.distinct_keys.to_be_bytes());
        Ok(())
    }

    fn read_native(bytes: &[u8]) -> io::Result<Self> {
        let (Ok(row_count), Ok(distinct_keys)) = (
            <[u8; 8]>::try_from(bytes.get(..8).unwrap_or_default()),
            <[u8; 8]>::try_from(bytes.get(8..).unwrap_or_default()),
        ) else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("statistics are 16 bytes, got {}", bytes.len()),
            ));
        };

        Ok(Self {
            row_count: f64::from_be_bytes(row_count),
            distinct_keys: u64::from_be_bytes(distinct_keys),
        })
    }
}

// ============================================================================
// Memo
// ============================================================================

/// A memo group whose members point back at it weakly.
#[derive(Debug, Default, Identifiable, Payload)]
#[payload(placeholder)]
pub struct MemoGroup {
    pub id: u32,
    pub members: Vec<Arc<MemoMember>>,
}

#[derive(Debug, Identifiable, Payload)]
pub struct MemoMember {
    pub group: std::sync::Weak<MemoGroup>,
    pub node: Arc<PlanNode>,
    pub cost: f64,
}

impl MemoGroup {
    /// Builds a group whose members all point back at it.
    pub fn new(
        id: u32,
        members: impl IntoIterator<Item = (Arc<PlanNode>, f64)>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|group| Self {
            id,
            members: members
                .into_iter()
                .map(|(node, cost)| {
                    Arc::new(MemoMember { group: group.clone(), node, cost })
                })
                .collect(),
        })
    }
}

// ============================================================================
// Sample Plans
// ============================================================================

/// A scan of `sales.orders` through `dfs`.
pub fn orders_scan(env: &TestEnvironment) -> Arc<PlanNode> {
    Arc::new(PlanNode::Scan(Scan {
        cluster: env.cluster(),
        table: env.catalog.table(&["sales", "orders"]),
        plugin: env.plugin("dfs"),
        row_type: env.data_type(&TypeDescription::structure([
            (
                "id".to_owned(),
                TypeDescription::scalar(TypeKind::BigInt).with_nullable(false),
            ),
            ("amount".to_owned(), TypeDescription::decimal(10, 2)),
        ])),
        traits: vec![PlanTrait::Convention("LOGICAL".to_owned())],
    }))
}

/// A self-join of `sales.orders` on a filtered and a projected branch that
/// share the same scan node.
pub fn sample_plan(env: &TestEnvironment) -> Arc<PlanNode> {
    let scan = orders_scan(env);
    let boolean = env.data_type(&TypeDescription::scalar(TypeKind::Boolean));

    let filter = Arc::new(PlanNode::Filter(Filter {
        cluster: env.cluster(),
        input: Arc::clone(&scan),
        condition: Expression::Call {
            operator: env.catalog.operator(">"),
            operands: vec![
                Expression::InputRef(1),
                Expression::Literal(Literal::Decimal {
                    unscaled: 10_000,
                    scale: 2,
                }),
            ],
            return_type: boolean.clone(),
        },
        statistics: Some(Statistics { row_count: 2.5e5, distinct_keys: 900 }),
    }));

    let project = Arc::new(PlanNode::Project(Project {
        cluster: env.cluster(),
        input: scan,
        expressions: vec![Expression::InputRef(0)],
        row_type: env.data_type(&TypeDescription::structure([(
            "id".to_owned(),
            TypeDescription::scalar(TypeKind::BigInt).with_nullable(false),
        )])),
        explained: Some("cached".to_owned()),
    }));

    Arc::new(PlanNode::Join(Join {
        cluster: env.cluster(),
        left: filter,
        right: project,
        condition: Expression::Call {
            operator: env.catalog.operator("="),
            operands: vec![Expression::InputRef(0), Expression::InputRef(2)],
            return_type: boolean,
        },
        kind: JoinKind::Inner,
    }))
}
