use std::sync::Arc;

use common::{
    auth::Auth,
    context::{Context, HandlerContext, ServiceState},
    entities::{
        case::Priority,
        evidence::{Condition, Evidence, EvidenceType},
        geofile::{AccessLevel, Geofile},
        report::{Report, ReportPriority, ReportStatus},
        user::User,
    },
    error,
};
use evidence::service::evidence::{CreateEvidence, EvidenceService};
use geofiles::service::geofile::{CreateGeofile, GeofileService};
use mongodb::bson::{doc, oid::ObjectId};
use records::service::report::{CreateReport, ReportService};
use serde_json::json;
use users::service::user::ensure_admin;

pub const ADMIN_PASSWORD: &str = "admin123";

fn system(state: &Arc<ServiceState>) -> Context {
    Context(
        Arc::clone(state),
        HandlerContext {
            user_auth: Auth::None,
        },
    )
}

fn tags(tags: &[&str]) -> Vec<String> {
    tags.iter().map(|tag| tag.to_string()).collect()
}

async fn seed_admin(state: &Arc<ServiceState>) -> error::Result<()> {
    let users = system(state).try_get_repository::<User<ObjectId>>()?;

    if ensure_admin(&users, ADMIN_PASSWORD).await? {
        log::info!("Created default admin account");
    }
    Ok(())
}

async fn seed_evidence(state: &Arc<ServiceState>) -> error::Result<()> {
    let context = system(state);
    if context
        .try_get_repository::<Evidence<ObjectId>>()?
        .count(doc! {})
        .await?
        > 0
    {
        return Ok(());
    }

    let samples = [
        CreateEvidence {
            kind: Some(EvidenceType::Physical),
            description: Some("Bloody knife found at crime scene".to_string()),
            location: Some("Kitchen counter, 123 Main St".to_string()),
            collected_by: Some("Officer Johnson".to_string()),
            tags: Some(tags(&["weapon", "blood", "fingerprints"])),
            weight: Some("0.5 kg".to_string()),
            condition: Some(Condition::Good),
            storage_location: Some("Evidence Room A".to_string()),
            evidence_room: Some("A-101".to_string()),
            bags_sealed: Some(true),
            photographed: Some(true),
            fingerprinted: Some(true),
            dna_collected: Some(true),
            priority: Some(Priority::High),
            notes: Some("Handle with extreme care, potential DNA evidence".to_string()),
            ..Default::default()
        },
        CreateEvidence {
            kind: Some(EvidenceType::Digital),
            description: Some("Mobile phone containing text messages".to_string()),
            location: Some("Suspect's pocket during arrest".to_string()),
            collected_by: Some("Detective Smith".to_string()),
            tags: Some(tags(&["phone", "digital", "messages"])),
            serial_number: Some("IMEI: 123456789012345".to_string()),
            condition: Some(Condition::Excellent),
            storage_location: Some("Digital Evidence Lab".to_string()),
            evidence_room: Some("D-205".to_string()),
            bags_sealed: Some(true),
            photographed: Some(true),
            notes: Some("Requires digital forensics analysis".to_string()),
            ..Default::default()
        },
        CreateEvidence {
            kind: Some(EvidenceType::Photo),
            description: Some("Crime scene photographs".to_string()),
            location: Some("Entire crime scene area".to_string()),
            collected_by: Some("Forensics Team".to_string()),
            tags: Some(tags(&["photos", "scene", "documentation"])),
            condition: Some(Condition::Excellent),
            storage_location: Some("Photo Archive".to_string()),
            priority: Some(Priority::Medium),
            ..Default::default()
        },
    ];

    let service = EvidenceService::new(context);
    for sample in samples {
        service.create(sample).await?;
    }
    log::info!("Seeded sample evidence");
    Ok(())
}

async fn seed_geofiles(state: &Arc<ServiceState>) -> error::Result<()> {
    let context = system(state);
    if context
        .try_get_repository::<Geofile<ObjectId>>()?
        .count(doc! {})
        .await?
        > 0
    {
        return Ok(());
    }

    let samples = [
        CreateGeofile {
            filename: Some("crime_hotspots_analysis.geojson".to_string()),
            filepath: Some("/geofiles/crime_hotspots_analysis.geojson".to_string()),
            file_type: Some("geojson".to_string()),
            file_size: Some(28_600),
            coordinates: Some(vec![-122.4094, 37.7849]),
            bounding_box: Some(vec![vec![-122.43, 37.78], vec![-122.39, 37.79]]),
            address: Some("500 Mission Street, San Francisco, CA".to_string()),
            location_name: Some("Mission District Analysis Zone".to_string()),
            description: Some(
                "Statistical analysis of crime hotspots based on 6-month incident data."
                    .to_string(),
            ),
            metadata: json!({
                "creator": "Crime Analytics Team",
                "incidents": 347,
                "methodology": "kernel_density_estimation",
            }),
            tags: tags(&["analysis", "crime", "hotspots", "statistics"]),
            access_level: Some(AccessLevel::Public),
            is_public: Some(true),
            ..Default::default()
        },
        CreateGeofile {
            filename: Some("emergency_evacuation_routes.gpx".to_string()),
            filepath: Some("/geofiles/emergency_evacuation_routes.gpx".to_string()),
            file_type: Some("gpx".to_string()),
            file_size: Some(12_300),
            coordinates: Some(vec![-122.3894, 37.7594]),
            address: Some("1800 3rd Street, San Francisco, CA".to_string()),
            location_name: Some("Emergency Response Corridor".to_string()),
            description: Some("Evacuation routes for emergency scenarios.".to_string()),
            metadata: json!({"creator": "Emergency Planning Unit"}),
            tags: tags(&["emergency", "evacuation", "routes", "safety"]),
            access_level: Some(AccessLevel::Internal),
            ..Default::default()
        },
        CreateGeofile {
            filename: Some("surveillance_coverage_map.shp".to_string()),
            filepath: Some("/geofiles/surveillance_coverage_map.shp".to_string()),
            file_type: Some("shp".to_string()),
            file_size: Some(45_200),
            coordinates: Some(vec![-122.4394, 37.7949]),
            bounding_box: Some(vec![vec![-122.46, 37.79], vec![-122.41, 37.80]]),
            address: Some("Citywide Coverage".to_string()),
            location_name: Some("CCTV Network Coverage".to_string()),
            description: Some("Surveillance camera coverage areas and blind spots.".to_string()),
            metadata: json!({"cameras": 156, "blindSpots": 12}),
            tags: tags(&["surveillance", "cctv", "coverage", "security"]),
            access_level: Some(AccessLevel::Department),
            ..Default::default()
        },
    ];

    let service = GeofileService::new(context);
    for sample in samples {
        service.create(sample).await?;
    }
    log::info!("Seeded sample geofiles");
    Ok(())
}

async fn seed_reports(state: &Arc<ServiceState>) -> error::Result<()> {
    let context = system(state);
    if context
        .try_get_repository::<Report<ObjectId>>()?
        .count(doc! {})
        .await?
        > 0
    {
        return Ok(());
    }

    let samples = [
        (
            "Warranty",
            "Vehicle Equipment Warranty Claim",
            "Police vehicle PV-001 radio equipment malfunction. Equipment still under warranty.",
            ReportStatus::Pending,
            ReportPriority::Medium,
        ),
        (
            "Incident",
            "Monthly Crime Statistics Report",
            "Analysis of incident types, resolution rates and geographical distribution.",
            ReportStatus::Completed,
            ReportPriority::Low,
        ),
        (
            "Investigation",
            "Theft Investigation Summary",
            "Multiple theft incidents downtown. Evidence collected and witnesses interviewed.",
            ReportStatus::Pending,
            ReportPriority::High,
        ),
        (
            "Case Summary",
            "Vehicle Accident Case Report",
            "Police response, evidence collection and witness statements for the Main Street accident.",
            ReportStatus::Approved,
            ReportPriority::Medium,
        ),
    ];

    let service = ReportService::new(context);
    for (kind, title, content, status, priority) in samples {
        service
            .create(CreateReport {
                kind: Some(kind.to_string()),
                title: Some(title.to_string()),
                content: Some(content.to_string()),
                status: Some(status),
                priority: Some(priority),
                ..Default::default()
            })
            .await?;
    }
    log::info!("Seeded sample reports");
    Ok(())
}

/// Fills empty collections with the default admin and sample records.
/// Failures are logged and never stop startup.
pub async fn seed(state: &Arc<ServiceState>) {
    if let Err(err) = seed_admin(state).await {
        log::error!("Failed to seed admin account: {}", err);
    }
    if let Err(err) = seed_evidence(state).await {
        log::error!("Failed to seed evidence: {}", err);
    }
    if let Err(err) = seed_geofiles(state).await {
        log::error!("Failed to seed geofiles: {}", err);
    }
    if let Err(err) = seed_reports(state).await {
        log::error!("Failed to seed reports: {}", err);
    }
}

#[cfg(test)]
mod tests {
    use common::storage::UploadStorage;

    use super::*;

    #[actix_web::test]
    async fn test_seeding_fills_empty_collections_once() {
        let state = Arc::new(ServiceState::in_memory(UploadStorage::new(
            std::env::temp_dir().join("police-seed"),
        )));

        seed(&state).await;
        seed(&state).await;

        let context = system(&state);
        assert_eq!(
            context
                .try_get_repository::<User<ObjectId>>()
                .unwrap()
                .count(doc! {})
                .await
                .unwrap(),
            1
        );
        assert_eq!(
            context
                .try_get_repository::<Evidence<ObjectId>>()
                .unwrap()
                .count(doc! {})
                .await
                .unwrap(),
            3
        );
        assert_eq!(
            context
                .try_get_repository::<Geofile<ObjectId>>()
                .unwrap()
                .count(doc! {})
                .await
                .unwrap(),
            3
        );
        assert_eq!(
            context
                .try_get_repository::<Report<ObjectId>>()
                .unwrap()
                .count(doc! {"status": "Approved"})
                .await
                .unwrap(),
            1
        );
    }
}
