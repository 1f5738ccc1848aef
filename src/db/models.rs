use sqlx::FromRow;

/// Column as reported by `information_schema.columns`
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct TableColumn {
    pub column_name: String,
    pub data_type: String,
}
