use std::sync::Arc;

use common::{
    config::Config,
    context::ServiceState,
    entities::{
        case::Case, evidence::Evidence, geofile::Geofile, license_plate::LicensePlate,
        ob_entry::ObEntry, officer::Officer, police_vehicle::PoliceVehicle, profile::Profile,
        report::Report, reset_token::ResetToken, user::User,
    },
    error,
    repository::{mongo_repository::MongoRepository, Entity, RepositoryObject},
    storage::UploadStorage,
};
use mongodb::{
    bson::{doc, oid::ObjectId},
    Client, Database,
};
use serde::{de::DeserializeOwned, Serialize};

pub async fn connect(config: &Config) -> error::Result<Database> {
    log::info!("Connecting to MongoDB at {}", config.masked_uri());

    let client = Client::with_uri_str(&config.mongo_uri).await?;
    let database = client.database(&config.database);
    database.run_command(doc! {"ping": 1}, None).await?;

    log::info!("Connected to database {}", config.database);
    Ok(database)
}

async fn collection<T>(
    database: &Database,
    name: &str,
    unique: &[&str],
) -> error::Result<RepositoryObject<T>>
where
    T: Entity + Serialize + DeserializeOwned + Unpin + Send + Sync + 'static,
{
    let repository = MongoRepository::<T>::new(database, name)
        .unique_index(unique)
        .await?;
    Ok(Arc::new(repository))
}

/// One repository per collection, with the unique indexes the services
/// rely on for conflict detection.
pub async fn build_state(database: &Database, config: &Config) -> error::Result<ServiceState> {
    let mut state = ServiceState::new();

    state.insert::<User<ObjectId>>(collection(database, "users", &["username", "email"]).await?);
    state.insert::<Profile<ObjectId>>(collection(database, "profiles", &[]).await?);
    state.insert::<ResetToken>(collection(database, "reset_tokens", &["token"]).await?);
    state.insert::<Case<ObjectId>>(collection(database, "cases", &["caseNumber"]).await?);
    state.insert::<ObEntry<ObjectId>>(collection(database, "ob_entries", &["obNumber"]).await?);
    state.insert::<Evidence<ObjectId>>(
        collection(database, "evidence", &["evidenceNumber"]).await?,
    );
    state.insert::<LicensePlate<ObjectId>>(
        collection(database, "license_plates", &["plateNumber"]).await?,
    );
    state.insert::<Officer<ObjectId>>(collection(database, "officers", &["badgeNumber"]).await?);
    state.insert::<Report<ObjectId>>(collection(database, "reports", &["reportNumber"]).await?);
    state.insert::<PoliceVehicle<ObjectId>>(collection(database, "police_vehicles", &[]).await?);
    state.insert::<Geofile<ObjectId>>(collection(database, "geofiles", &[]).await?);

    state.insert_manual(UploadStorage::new(config.upload_dir.clone()));

    Ok(state)
}
