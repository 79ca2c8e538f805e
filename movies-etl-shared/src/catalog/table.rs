use std::fmt;
use std::str::FromStr;

use crate::errors::PlanError;

/// Tables of the content schema moved by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    FilmWork,
    Genre,
    Person,
    GenreFilmWork,
    PersonFilmWork,
}

/// Storage kind of a column, used when binding values and reading them back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Uuid,
    Text,
    Date,
    Float,
    Timestamp,
}

/// Mapping of one record field onto one destination column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Field name on the record, which is also the source column name.
    pub field: &'static str,
    /// Column name in the destination table.
    pub column: &'static str,
    pub kind: ColumnKind,
}

/// Static description of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
    pub table: Table,
    pub name: &'static str,
    /// Columns in insert order.
    pub columns: &'static [ColumnSpec],
    /// Tables whose rows must exist before rows of this table can be inserted.
    pub depends_on: &'static [Table],
    /// Default source column used to order rows during verification.
    pub verify_order: &'static str,
}

const fn column(field: &'static str, column: &'static str, kind: ColumnKind) -> ColumnSpec {
    ColumnSpec { field, column, kind }
}

const CREATED: ColumnSpec = column("created_at", "created", ColumnKind::Timestamp);
const MODIFIED: ColumnSpec = column("updated_at", "modified", ColumnKind::Timestamp);

static FILM_WORK: TableSpec = TableSpec {
    table: Table::FilmWork,
    name: "film_work",
    columns: &[
        column("id", "id", ColumnKind::Uuid),
        column("title", "title", ColumnKind::Text),
        column("description", "description", ColumnKind::Text),
        column("creation_date", "creation_date", ColumnKind::Date),
        column("rating", "rating", ColumnKind::Float),
        column("type", "type", ColumnKind::Text),
        CREATED,
        MODIFIED,
    ],
    depends_on: &[],
    verify_order: "id",
};

static GENRE: TableSpec = TableSpec {
    table: Table::Genre,
    name: "genre",
    columns: &[
        column("id", "id", ColumnKind::Uuid),
        column("name", "name", ColumnKind::Text),
        column("description", "description", ColumnKind::Text),
        CREATED,
        MODIFIED,
    ],
    depends_on: &[],
    verify_order: "id",
};

static PERSON: TableSpec = TableSpec {
    table: Table::Person,
    name: "person",
    columns: &[
        column("id", "id", ColumnKind::Uuid),
        column("full_name", "full_name", ColumnKind::Text),
        CREATED,
        MODIFIED,
    ],
    depends_on: &[],
    verify_order: "created_at",
};

static GENRE_FILM_WORK: TableSpec = TableSpec {
    table: Table::GenreFilmWork,
    name: "genre_film_work",
    columns: &[
        column("id", "id", ColumnKind::Uuid),
        column("genre_id", "genre_id", ColumnKind::Uuid),
        column("film_work_id", "film_work_id", ColumnKind::Uuid),
        CREATED,
    ],
    depends_on: &[Table::Genre, Table::FilmWork],
    verify_order: "id",
};

static PERSON_FILM_WORK: TableSpec = TableSpec {
    table: Table::PersonFilmWork,
    name: "person_film_work",
    columns: &[
        column("id", "id", ColumnKind::Uuid),
        column("film_work_id", "film_work_id", ColumnKind::Uuid),
        column("person_id", "person_id", ColumnKind::Uuid),
        column("role", "role", ColumnKind::Text),
        CREATED,
    ],
    depends_on: &[Table::FilmWork, Table::Person],
    verify_order: "id",
};

impl Table {
    /// Every table, entities first.
    pub const ALL: [Table; 5] = [
        Table::FilmWork,
        Table::Genre,
        Table::Person,
        Table::GenreFilmWork,
        Table::PersonFilmWork,
    ];

    pub fn spec(self) -> &'static TableSpec {
        match self {
            Table::FilmWork => &FILM_WORK,
            Table::Genre => &GENRE,
            Table::Person => &PERSON,
            Table::GenreFilmWork => &GENRE_FILM_WORK,
            Table::PersonFilmWork => &PERSON_FILM_WORK,
        }
    }

    /// Wire name of the table in both source and destination.
    pub fn name(self) -> &'static str {
        self.spec().name
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Table {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Table::ALL
            .into_iter()
            .find(|table| table.name() == s.trim())
            .ok_or_else(|| PlanError::UnknownTable(s.to_string()))
    }
}

impl TableSpec {
    /// Returns true if `name` is a column of the source table.
    pub fn has_source_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.field == name)
    }

    /// Destination column names in insert order.
    pub fn destination_columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|c| c.column)
    }
}

impl ColumnSpec {
    pub fn is_timestamp(&self) -> bool {
        self.kind == ColumnKind::Timestamp
    }

    /// Select expression that reads the destination column back under the
    /// record field name. Identifiers, dates and timestamps come back as text.
    pub fn select_expr(&self) -> String {
        match self.kind {
            ColumnKind::Uuid | ColumnKind::Date | ColumnKind::Timestamp => {
                format!("{}::text AS {}", self.column, self.field)
            }
            ColumnKind::Text | ColumnKind::Float if self.column == self.field => {
                self.column.to_string()
            }
            ColumnKind::Text | ColumnKind::Float => format!("{} AS {}", self.column, self.field),
        }
    }
}
