//! Relational backend for flowerstore.
//!
//! Works with any url the `sqlx` any-driver understands and that uses `?` placeholders,
//! which covers MySQL and SQLite.
use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use flowerstore_core::product::{NewProduct, Product, ProductKind, ProductType};
use flowerstore_core::repository::{
    ProductRepository, RepositoryError, Result, TicketRepository, next_id,
};
use flowerstore_core::ticket::{NewTicket, Ticket, TicketLine};
use serde::Deserialize;
use sqlx::{
    AnyPool, Executor, Row,
    any::{AnyPoolOptions, AnyRow, install_default_drivers},
    pool::PoolOptions,
};
use tracing::{debug, instrument};

pub mod error;

use crate::error::Error;

const PRODUCT_COLUMNS: &str = "product_id, name, quantity, price, product_type, attribute";
/// Inserts retried when a concurrent writer claims the same id.
const MAX_ID_ATTEMPTS: u32 = 32;

/// Configuration for the sql store.
#[derive(Deserialize, Debug)]
pub struct SqlStoreConfig {
    url: String,
    #[serde(default)]
    max_connections: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct SqlStore {
    pool: AnyPool,
}

impl SqlStore {
    /// Creates the store from the `storage` settings of the configuration.
    pub async fn from_config(config_value: &serde_yaml::Value) -> Result<Self, Error> {
        let config: SqlStoreConfig = serde_yaml::from_value(config_value.clone())?;
        Self::connect(&config.url, config.max_connections).await
    }

    #[instrument(skip(url))]
    pub async fn connect(url: &str, max_connections: Option<u32>) -> Result<Self, Error> {
        install_default_drivers();

        let mut pool_options: AnyPoolOptions = PoolOptions::new();
        if let Some(max) = max_connections {
            pool_options = pool_options.max_connections(max);
        }

        // Every connection to an in-memory database sees its own database.
        if is_in_memory(url) {
            pool_options = pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = AnyPoolOptions::after_connect(pool_options, |connection, _| {
            Box::pin(async move {
                connection
                    .execute(
                        "create table if not exists products (
                                product_id bigint not null primary key,
                                name varchar(255) not null,
                                quantity bigint not null,
                                price double not null,
                                product_type varchar(32) not null,
                                attribute varchar(255) not null
                            );",
                    )
                    .await?;
                connection
                    .execute(
                        "create table if not exists tickets (
                                ticket_id bigint not null primary key,
                                date varchar(64) not null,
                                total_price double not null
                            );",
                    )
                    .await?;
                connection
                    .execute(
                        "create table if not exists ticket_lines (
                                ticket_id bigint not null,
                                line_no bigint not null,
                                name varchar(255) not null,
                                product_type varchar(32) not null,
                                features varchar(255) not null,
                                quantity bigint not null,
                                price double not null,
                                primary key (ticket_id, line_no)
                            );",
                    )
                    .await?;
                Ok(())
            })
        })
        .connect_lazy(url)?;

        debug!("Sql store pool created");
        Ok(SqlStore { pool })
    }

    async fn max_id(&self, query: &str) -> Result<Option<u32>, Error> {
        let row = sqlx::query(query).fetch_one(&self.pool).await?;
        let max: Option<i64> = row.try_get(0)?;
        max.map(to_u32).transpose()
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(e) if e.is_unique_violation())
}

fn is_in_memory(url: &str) -> bool {
    url == "sqlite://" || url.starts_with("sqlite::memory:") || url.contains("mode=memory")
}

fn to_u32(value: i64) -> Result<u32, Error> {
    u32::try_from(value).map_err(|_| Error::DecodeError(format!("value {value} out of range")))
}

fn product_from_row(row: &AnyRow) -> Result<Product, Error> {
    let product_type: String = row.try_get(4)?;
    let product_type: ProductType = product_type
        .parse()
        .map_err(|_| Error::DecodeError(format!("product type '{product_type}'")))?;
    let attribute: String = row.try_get(5)?;
    let kind = ProductKind::from_attribute(product_type, &attribute)
        .map_err(|e| Error::DecodeError(e.to_string()))?;
    Ok(Product {
        id: to_u32(row.try_get(0)?)?,
        name: row.try_get(1)?,
        quantity: to_u32(row.try_get(2)?)?,
        price: row.try_get(3)?,
        kind,
    })
}

fn line_from_row(row: &AnyRow) -> Result<(u32, TicketLine), Error> {
    let product_type: String = row.try_get(2)?;
    let line = TicketLine {
        name: row.try_get(1)?,
        product_type: product_type
            .parse()
            .map_err(|_| Error::DecodeError(format!("Invalid product type : {product_type}")))?,
        attribute: row.try_get(3)?,
        quantity: to_u32(row.try_get(4)?)?,
        price: row.try_get(5)?,
    };
    Ok((to_u32(row.try_get(0)?)?, line))
}

fn ticket_from_row(row: &AnyRow, lines: Vec<TicketLine>) -> Result<Ticket, Error> {
    let date: String = row.try_get(1)?;
    Ok(Ticket {
        id: to_u32(row.try_get(0)?)?,
        date: parse_date(&date)?,
        lines,
        total: row.try_get(2)?,
    })
}

fn parse_date(value: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| Error::DecodeError(format!("date '{value}': {e}")))
}

#[async_trait]
impl ProductRepository for SqlStore {
    async fn get_product(&self, id: u32) -> Result<Option<Product>> {
        let row = sqlx::query(&format!(
            "select {PRODUCT_COLUMNS} from products where product_id = ?;"
        ))
        .bind(i64::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::from)?;
        Ok(row.as_ref().map(product_from_row).transpose()?)
    }

    async fn all_products(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query(&format!(
            "select {PRODUCT_COLUMNS} from products order by product_type desc, product_id asc;"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::from)?;
        Ok(rows
            .iter()
            .map(product_from_row)
            .collect::<Result<Vec<_>, Error>>()?)
    }

    async fn last_product(&self) -> Result<Option<Product>> {
        let row = sqlx::query(&format!(
            "select {PRODUCT_COLUMNS} from products order by product_id desc limit 1;"
        ))
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::from)?;
        Ok(row.as_ref().map(product_from_row).transpose()?)
    }

    #[instrument(skip(self, product), fields(name = %product.name))]
    async fn add_product(&self, product: NewProduct) -> Result<Product> {
        product.validate()?;

        let mut attempts = 0;
        loop {
            attempts += 1;
            let id = next_id(self.max_id("select max(product_id) from products;").await?);
            let stored = Product::from_new(id, product.clone());

            let result = sqlx::query(&format!(
                "insert into products ({PRODUCT_COLUMNS}) values (?, ?, ?, ?, ?, ?);"
            ))
            .bind(i64::from(stored.id))
            .bind(stored.name.clone())
            .bind(i64::from(stored.quantity))
            .bind(stored.price)
            .bind(stored.product_type().to_string())
            .bind(stored.attribute())
            .execute(&self.pool)
            .await;

            match result {
                Ok(_) => {
                    debug!(id, "Product stored");
                    return Ok(stored);
                }
                // Another writer took the id first.
                Err(e) if is_unique_violation(&e) && attempts < MAX_ID_ATTEMPTS => {
                    debug!(id, attempts, "Product id taken, retrying");
                }
                Err(e) => return Err(Error::from(e).into()),
            }
        }
    }

    async fn update_product(&self, product: &Product) -> Result<()> {
        let result = sqlx::query("update products set quantity = ?, price = ? where product_id = ?;")
            .bind(i64::from(product.quantity))
            .bind(product.price)
            .bind(i64::from(product.id))
            .execute(&self.pool)
            .await
            .map_err(Error::from)?;
        if result.rows_affected() == 0 {
            // MySQL reports zero affected rows when values are unchanged.
            if self.get_product(product.id).await?.is_none() {
                return Err(RepositoryError::NotFound(format!(
                    "product with id {}",
                    product.id
                )));
            }
        }
        Ok(())
    }

    async fn delete_product(&self, id: u32) -> Result<()> {
        let result = sqlx::query("delete from products where product_id = ?;")
            .bind(i64::from(id))
            .execute(&self.pool)
            .await
            .map_err(Error::from)?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("product with id {id}")));
        }
        Ok(())
    }

    #[instrument(skip(self, items), fields(items = items.len()))]
    async fn take_stock(&self, items: &[(u32, u32)]) -> Result<Vec<Product>> {
        let mut tx = self.pool.begin().await.map_err(Error::from)?;
        let mut taken = Vec::with_capacity(items.len());
        for &(id, quantity) in items {
            // Writing first makes the transaction take the write lock before any read.
            let result = sqlx::query(
                "update products set quantity = quantity - ? where product_id = ? and quantity >= ?;",
            )
            .bind(i64::from(quantity))
            .bind(i64::from(id))
            .bind(i64::from(quantity))
            .execute(&mut *tx)
            .await
            .map_err(Error::from)?;

            let row = sqlx::query(&format!(
                "select {PRODUCT_COLUMNS} from products where product_id = ?;"
            ))
            .bind(i64::from(id))
            .fetch_optional(&mut *tx)
            .await
            .map_err(Error::from)?;
            let Some(row) = row else {
                return Err(RepositoryError::NotFound(format!("product with id {id}")));
            };
            let product = product_from_row(&row)?;
            // MySQL reports zero affected rows for a zero decrement.
            if result.rows_affected() == 0 && quantity > 0 {
                return Err(RepositoryError::InsufficientStock {
                    name: product.name,
                    available: product.quantity,
                    requested: quantity,
                });
            }
            taken.push(product);
        }
        tx.commit().await.map_err(Error::from)?;
        Ok(taken)
    }
}

#[async_trait]
impl TicketRepository for SqlStore {
    #[instrument(skip(self, ticket))]
    async fn add_ticket(&self, ticket: NewTicket) -> Result<Ticket> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            let id = next_id(self.max_id("select max(ticket_id) from tickets;").await?);
            let stored = Ticket::from_new(id, ticket.clone());

            let mut tx = self.pool.begin().await.map_err(Error::from)?;
            let result =
                sqlx::query("insert into tickets (ticket_id, date, total_price) values (?, ?, ?);")
                    .bind(i64::from(stored.id))
                    .bind(stored.date.to_rfc3339())
                    .bind(stored.total)
                    .execute(&mut *tx)
                    .await;
            match result {
                Ok(_) => {}
                // Another writer took the id first; dropping the transaction rolls it back.
                Err(e) if is_unique_violation(&e) && attempts < MAX_ID_ATTEMPTS => {
                    debug!(id, attempts, "Ticket id taken, retrying");
                    continue;
                }
                Err(e) => return Err(Error::from(e).into()),
            }

            for (line_no, line) in stored.lines.iter().enumerate() {
                sqlx::query(
                    "insert into ticket_lines (ticket_id, line_no, name, product_type, features, quantity, price) values (?, ?, ?, ?, ?, ?, ?);",
                )
                .bind(i64::from(stored.id))
                .bind(line_no as i64)
                .bind(line.name.clone())
                .bind(line.product_type.to_string())
                .bind(line.attribute.clone())
                .bind(i64::from(line.quantity))
                .bind(line.price)
                .execute(&mut *tx)
                .await
                .map_err(Error::from)?;
            }
            tx.commit().await.map_err(Error::from)?;

            debug!(id, total = stored.total, "Ticket stored");
            return Ok(stored);
        }
    }

    async fn last_ticket(&self) -> Result<Option<Ticket>> {
        let row = sqlx::query(
            "select ticket_id, date, total_price from tickets order by ticket_id desc limit 1;",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::from)?;
        let Some(row) = row else {
            return Ok(None);
        };

        let line_rows = sqlx::query(
            "select ticket_id, name, product_type, features, quantity, price from ticket_lines where ticket_id = ? order by line_no;",
        )
        .bind(row.try_get::<i64, _>(0).map_err(Error::from)?)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::from)?;
        let lines = line_rows
            .iter()
            .map(|r| line_from_row(r).map(|(_, line)| line))
            .collect::<Result<Vec<_>, Error>>()?;
        Ok(Some(ticket_from_row(&row, lines)?))
    }

    async fn all_tickets(&self) -> Result<Vec<Ticket>> {
        let ticket_rows =
            sqlx::query("select ticket_id, date, total_price from tickets order by ticket_id;")
                .fetch_all(&self.pool)
                .await
                .map_err(Error::from)?;
        let line_rows = sqlx::query(
            "select ticket_id, name, product_type, features, quantity, price from ticket_lines order by ticket_id, line_no;",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::from)?;

        let mut lines: BTreeMap<u32, Vec<TicketLine>> = BTreeMap::new();
        for row in &line_rows {
            let (ticket_id, line) = line_from_row(row)?;
            lines.entry(ticket_id).or_default().push(line);
        }

        let mut tickets = Vec::with_capacity(ticket_rows.len());
        for row in &ticket_rows {
            let id = to_u32(row.try_get(0).map_err(Error::from)?)?;
            tickets.push(ticket_from_row(row, lines.remove(&id).unwrap_or_default())?);
        }
        Ok(tickets)
    }
}
