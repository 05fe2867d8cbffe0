/// Separator between entity alias and column name in namespaced result columns
/// (`product_name`). Aliases must not contain it; column names may.
pub const ALIAS_SEPARATOR: char = '_';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    /// PostgreSQL type used to cast bound parameters (e.g. `int4[]`, `timestamptz`).
    pub pg_type: &'static str,
    /// Whether the database fills the column when an insert omits it.
    pub has_default: bool,
    /// Whether the column may be set through create/update.
    pub writable: bool,
}

impl Column {
    pub const fn writable(name: &'static str, pg_type: &'static str) -> Self {
        Column { name, pg_type, has_default: false, writable: true }
    }

    pub const fn writable_with_default(name: &'static str, pg_type: &'static str) -> Self {
        Column { name, pg_type, has_default: true, writable: true }
    }

    pub const fn managed(name: &'static str, pg_type: &'static str) -> Self {
        Column { name, pg_type, has_default: true, writable: false }
    }
}

/// Static description of one entity type. Its storage name is resolved through
/// [`TableNameCache`](super::TableNameCache), never read directly by the composer.
#[derive(Debug, PartialEq, Eq)]
pub struct EntityDescriptor {
    /// Query alias and namespace prefix, e.g. `product`.
    pub alias: &'static str,
    /// Unqualified table name, e.g. `products`. Also the collection name children hydrate into.
    pub table: &'static str,
    pub primary_key: &'static str,
    pub columns: &'static [Column],
    /// Column set on soft delete; rows with it non-null are invisible to reads.
    pub deleted_at: Option<&'static str>,
    /// Column bumped to `NOW()` on update.
    pub updated_at: Option<&'static str>,
}

impl EntityDescriptor {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Name of the containment column on this entity that holds `child` ids.
    pub fn containment_column(&self, child: &EntityDescriptor) -> String {
        format!("{}{}ids", child.alias, ALIAS_SEPARATOR)
    }

    /// Display name used in NotFound messages.
    pub fn label(&self) -> &'static str {
        self.alias
    }
}
