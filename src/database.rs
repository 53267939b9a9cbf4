use color_eyre::{Result, eyre::Context, eyre::eyre};
use migration::MigratorTrait;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectOptions, ConnectionTrait,
    Database as SeaDatabase, DatabaseConnection, EntityTrait, QueryFilter,
};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

use crate::entities;

pub struct Database {
    pub conn: DatabaseConnection,
}

#[derive(Debug, Clone, Serialize)]
pub struct Artist {
    pub id: i64,
    pub name: String,
    pub genre: Option<String>,
    pub website: Option<String>,
}

/// An event joined with the artist it references.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub id: i64,
    pub artist_id: i64,
    pub artist_name: String,
    pub name: String,
    pub date: String,
    pub location: Option<String>,
    pub price: Option<f64>,
}

fn joined_event(
    event: entities::event::Model,
    artist: Option<entities::artist::Model>,
) -> Result<Event> {
    // The foreign key guarantees a matching artist for every persisted event
    let artist = artist.ok_or_else(|| eyre!("Event {} has no matching artist", event.id))?;
    Ok(Event {
        id: event.id,
        artist_id: artist.id,
        artist_name: artist.name,
        name: event.name,
        date: event.date,
        location: event.location,
        price: event.price,
    })
}

impl Database {
    /// Open or create a database at the given path
    pub async fn open(path: &Path) -> Result<Self> {
        log::debug!("Opening database at: {}", path.display());

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context(format!(
                "Failed to create database directory: {}",
                parent.display()
            ))?;
        }

        // Create SQLite connection URL
        let url = format!("sqlite://{}?mode=rwc", path.display());

        // Configure connection options
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(100)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(8))
            .acquire_timeout(Duration::from_secs(8))
            .idle_timeout(Duration::from_secs(8))
            .max_lifetime(Duration::from_secs(8))
            .sqlx_logging(false);

        let conn = SeaDatabase::connect(opt)
            .await
            .context(format!("Failed to open database: {}", path.display()))?;

        // Cascading delete on events requires foreign key enforcement
        conn.execute_unprepared("PRAGMA foreign_keys = ON")
            .await
            .context("Failed to enable foreign keys")?;

        // Run migrations
        log::debug!("Running database migrations");
        migration::Migrator::up(&conn, None)
            .await
            .context("Failed to run database migrations")?;

        log::info!("Database ready at: {}", path.display());
        Ok(Database { conn })
    }

    // ========== Artist Methods ==========

    pub async fn list_artists(&self) -> Result<Vec<Artist>> {
        let artists = entities::artist::Entity::find()
            .all(&self.conn)
            .await
            .context("Failed to list artists")?;

        Ok(artists
            .into_iter()
            .map(|a| Artist {
                id: a.id,
                name: a.name,
                genre: a.genre,
                website: a.website,
            })
            .collect())
    }

    pub async fn get_artist(&self, id: i64) -> Result<Option<Artist>> {
        let artist = entities::artist::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to get artist")?;

        Ok(artist.map(|a| Artist {
            id: a.id,
            name: a.name,
            genre: a.genre,
            website: a.website,
        }))
    }

    pub async fn create_artist(
        &self,
        name: &str,
        genre: Option<&str>,
        website: Option<&str>,
    ) -> Result<i64> {
        log::debug!("Creating artist: '{}'", name);

        let new_artist = entities::artist::ActiveModel {
            id: ActiveValue::NotSet,
            name: ActiveValue::Set(name.to_string()),
            genre: ActiveValue::Set(genre.map(|s| s.to_string())),
            website: ActiveValue::Set(website.map(|s| s.to_string())),
        };

        let result = new_artist
            .insert(&self.conn)
            .await
            .context("Failed to insert artist")?;

        log::info!("Artist created: '{}' (ID: {})", name, result.id);
        Ok(result.id)
    }

    /// Overwrites every column of the matched row; returns the affected-row
    /// count so the caller can distinguish a missing id.
    pub async fn update_artist(
        &self,
        id: i64,
        name: &str,
        genre: Option<&str>,
        website: Option<&str>,
    ) -> Result<u64> {
        log::debug!("Updating artist (ID: {})", id);

        let fields = entities::artist::ActiveModel {
            id: ActiveValue::NotSet,
            name: ActiveValue::Set(name.to_string()),
            genre: ActiveValue::Set(genre.map(|s| s.to_string())),
            website: ActiveValue::Set(website.map(|s| s.to_string())),
        };

        let result = entities::artist::Entity::update_many()
            .set(fields)
            .filter(entities::artist::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .context("Failed to update artist")?;

        Ok(result.rows_affected)
    }

    /// Deletes the artist; the store cascades to its events. Returns the
    /// affected-row count (children are not counted).
    pub async fn delete_artist(&self, id: i64) -> Result<u64> {
        log::debug!("Deleting artist (ID: {})", id);

        let result = entities::artist::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete artist")?;

        Ok(result.rows_affected)
    }

    // ========== Event Methods ==========

    pub async fn list_events(&self) -> Result<Vec<Event>> {
        let rows = entities::event::Entity::find()
            .find_also_related(entities::artist::Entity)
            .all(&self.conn)
            .await
            .context("Failed to list events")?;

        rows.into_iter()
            .map(|(event, artist)| joined_event(event, artist))
            .collect()
    }

    pub async fn get_event(&self, id: i64) -> Result<Option<Event>> {
        let row = entities::event::Entity::find_by_id(id)
            .find_also_related(entities::artist::Entity)
            .one(&self.conn)
            .await
            .context("Failed to get event")?;

        row.map(|(event, artist)| joined_event(event, artist))
            .transpose()
    }

    pub async fn create_event(
        &self,
        artist_id: i64,
        name: &str,
        date: &str,
        location: Option<&str>,
        price: Option<f64>,
    ) -> Result<i64> {
        log::debug!("Creating event: '{}' (artist ID: {})", name, artist_id);

        let new_event = entities::event::ActiveModel {
            id: ActiveValue::NotSet,
            artist_id: ActiveValue::Set(artist_id),
            name: ActiveValue::Set(name.to_string()),
            date: ActiveValue::Set(date.to_string()),
            location: ActiveValue::Set(location.map(|s| s.to_string())),
            price: ActiveValue::Set(price),
        };

        let result = new_event
            .insert(&self.conn)
            .await
            .context("Failed to insert event")?;

        log::info!("Event created: '{}' (ID: {})", name, result.id);
        Ok(result.id)
    }

    pub async fn update_event(
        &self,
        id: i64,
        artist_id: i64,
        name: &str,
        date: &str,
        location: Option<&str>,
        price: Option<f64>,
    ) -> Result<u64> {
        log::debug!("Updating event (ID: {})", id);

        let fields = entities::event::ActiveModel {
            id: ActiveValue::NotSet,
            artist_id: ActiveValue::Set(artist_id),
            name: ActiveValue::Set(name.to_string()),
            date: ActiveValue::Set(date.to_string()),
            location: ActiveValue::Set(location.map(|s| s.to_string())),
            price: ActiveValue::Set(price),
        };

        let result = entities::event::Entity::update_many()
            .set(fields)
            .filter(entities::event::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .context("Failed to update event")?;

        Ok(result.rows_affected)
    }

    pub async fn delete_event(&self, id: i64) -> Result<u64> {
        log::debug!("Deleting event (ID: {})", id);

        let result = entities::event::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete event")?;

        Ok(result.rows_affected)
    }
}
