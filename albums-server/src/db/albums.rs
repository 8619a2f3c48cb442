//! Album accessor
//!
//! Runs the fixed listing query and decodes each row positionally into an
//! [`Album`]. The decoding loop is generic over the row stream so it works
//! the same on a live connection and on a scripted stream in tests.

use std::pin::pin;

use futures::{Stream, StreamExt};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{Column, PgConnection, Row, TypeInfo};

use crate::error::AccessError;
use crate::models::Album;

/// The one query this service issues.
pub const LIST_ALBUMS_SQL: &str = "SELECT * FROM album";

const ALBUM_COLUMNS: usize = 4;
const PRICE_COLUMN: usize = 3;

/// A result row that can be decoded into an [`Album`].
pub trait AlbumRow {
    fn decode_album(&self) -> Result<Album, sqlx::Error>;
}

impl AlbumRow for PgRow {
    fn decode_album(&self) -> Result<Album, sqlx::Error> {
        let columns = self.len();
        if columns != ALBUM_COLUMNS {
            return Err(sqlx::Error::Decode(
                format!("expected {ALBUM_COLUMNS} columns, found {columns}").into(),
            ));
        }

        Ok(Album {
            id: self.try_get(0)?,
            title: self.try_get(1)?,
            artist: self.try_get(2)?,
            price: decode_price(self)?,
        })
    }
}

/// Read the price as `f64` from any numeric column type.
fn decode_price(row: &PgRow) -> Result<f64, sqlx::Error> {
    match row.column(PRICE_COLUMN).type_info().name() {
        "FLOAT4" => row.try_get::<f32, _>(PRICE_COLUMN).map(f64::from),
        "INT2" => row.try_get::<i16, _>(PRICE_COLUMN).map(f64::from),
        "INT4" => row.try_get::<i32, _>(PRICE_COLUMN).map(f64::from),
        "INT8" => row.try_get::<i64, _>(PRICE_COLUMN).map(|price| price as f64),
        "NUMERIC" => {
            let price: Decimal = row.try_get(PRICE_COLUMN)?;
            numeric_price(price)
        }
        // FLOAT8, or a type mismatch reported by sqlx
        _ => row.try_get(PRICE_COLUMN),
    }
}

/// Nearest `f64` to the decimal value, so `56.99` serializes as `56.99`.
fn numeric_price(price: Decimal) -> Result<f64, sqlx::Error> {
    price
        .to_string()
        .parse()
        .map_err(|err: std::num::ParseFloatError| sqlx::Error::ColumnDecode {
            index: PRICE_COLUMN.to_string(),
            source: err.into(),
        })
}

/// Drain a row stream into albums, preserving stream order.
///
/// An error before the first row is a query failure; after it, a cursor
/// failure. The stream is owned here and dropped on every return.
pub async fn collect_albums<S, R>(rows: S) -> Result<Vec<Album>, AccessError>
where
    S: Stream<Item = Result<R, sqlx::Error>>,
    R: AlbumRow,
{
    let mut rows = pin!(rows);
    let mut albums = Vec::new();

    while let Some(row) = rows.next().await {
        let row = match row {
            Ok(row) => row,
            Err(source) if albums.is_empty() => return Err(AccessError::Query(source)),
            Err(source) => {
                return Err(AccessError::Cursor {
                    rows_read: albums.len(),
                    source,
                })
            }
        };

        let album = row.decode_album().map_err(|source| AccessError::Decode {
            row: albums.len(),
            source,
        })?;
        albums.push(album);
    }

    Ok(albums)
}

/// Album repository over a single checked-out connection.
pub struct AlbumRepo<'a> {
    conn: &'a mut PgConnection,
}

impl<'a> AlbumRepo<'a> {
    pub fn new(conn: &'a mut PgConnection) -> Self {
        Self { conn }
    }

    /// List every album in store order.
    pub async fn list(&mut self) -> Result<Vec<Album>, AccessError> {
        let rows = sqlx::query(LIST_ALBUMS_SQL).fetch(&mut *self.conn);
        collect_albums(rows).await
    }
}
