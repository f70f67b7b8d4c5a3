use std::io::Write;
use std::path::PathBuf;

use chrono::Local;
use clap::Args;
use ems_routing::error::AppError;
use ems_routing::routing::{GeoPoint, RegionQuery, RoutingResponse, TriageError};

use crate::infra::demo_api;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// KTAS severity level (1 = most urgent)
    #[arg(long, default_value_t = 2)]
    pub(crate) severity: u8,
    /// Chief complaint code from the triage classifier
    #[arg(long, default_value = "chest_pain")]
    pub(crate) complaint: String,
    /// Follow-up hospital reference (facility code or name)
    #[arg(long)]
    pub(crate) followup: Option<String>,
    /// Incident latitude; enables the nearest-hospital shortlist
    #[arg(long, requires = "longitude")]
    pub(crate) latitude: Option<f64>,
    /// Incident longitude
    #[arg(long, requires = "latitude")]
    pub(crate) longitude: Option<f64>,
    /// Patients to reserve at the top-ranked hospital during the demo
    #[arg(long, default_value_t = 1)]
    pub(crate) patients: u32,
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    /// KTAS severity level
    #[arg(long, default_value_t = 2)]
    pub(crate) severity: u8,
    /// Chief complaint code from the triage classifier
    #[arg(long, default_value = "chest_pain")]
    pub(crate) complaint: String,
    /// Destination CSV file (stdout when omitted)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

fn demo_region() -> RegionQuery {
    RegionQuery {
        province: "서울특별시".to_string(),
        district: None,
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let api = demo_api(demo_region()).map_err(TriageError::from)?;

    println!("Emergency routing demo");
    println!(
        "Case: KTAS {} / complaint '{}' in {} at {}",
        args.severity,
        args.complaint,
        demo_region().province,
        Local::now().format("%Y-%m-%d %H:%M")
    );

    let response = api.router.route_by_code(
        args.severity,
        &args.complaint,
        args.followup.as_deref(),
        &demo_region(),
    )?;
    let response = match (args.latitude, args.longitude) {
        (Some(latitude), Some(longitude)) => api.router.shortlist_nearest(
            response,
            &api.distances,
            GeoPoint {
                latitude,
                longitude,
            },
            3,
        )?,
        _ => response,
    };

    println!(
        "Required procedure groups: {}",
        response.case.required_group_labels.join(", ")
    );
    if let Some(followup) = &response.followup {
        println!("Follow-up hospital resolved to {followup}");
    }
    println!();
    render_candidates(&response);

    let Some(top) = response.hospitals.first() else {
        println!("No hospital in the region can take this patient right now.");
        return Ok(());
    };

    println!();
    println!(
        "Reserving {} bed(s) at {} ({})...",
        args.patients, top.name, top.id
    );
    let complaint = response.case.complaint;
    let receipt = api.router.reserve(&top.id, complaint, args.patients)?;
    println!(
        "  held {} x {}; pending now {:?}",
        receipt.patients, receipt.bed_type, receipt.pending
    );

    let rerank = api.router.route_by_code(
        args.severity,
        &args.complaint,
        args.followup.as_deref(),
        &demo_region(),
    )?;
    println!();
    println!("Ranking after the reservation:");
    render_candidates(&rerank);

    api.router.release(&top.id, complaint, args.patients)?;
    println!();
    println!("Reservation released; ledger drained.");
    Ok(())
}

fn render_candidates(response: &RoutingResponse) {
    if response.hospitals.is_empty() {
        println!("  (no candidates)");
        return;
    }
    for (rank, candidate) in response.hospitals.iter().enumerate() {
        println!(
            "  {}. {:<10} {}  priority {:>6.1}  beds {:>3}  {}",
            rank + 1,
            candidate.id,
            candidate.name,
            candidate.priority_score,
            candidate.total_effective_beds,
            candidate.coverage_level.label(),
        );
        if let (Some(distance_km), Some(duration_secs)) =
            (candidate.distance_km, candidate.duration_secs)
        {
            println!(
                "       {:.1} km away, about {} min by ambulance",
                distance_km,
                duration_secs.div_ceil(60)
            );
        }
        println!("       {}", candidate.reason_summary);
    }
}

pub(crate) fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let api = demo_api(demo_region()).map_err(TriageError::from)?;
    let response =
        api.router
            .route_by_code(args.severity, &args.complaint, None, &demo_region())?;

    match args.output {
        Some(path) => {
            let writer = csv::Writer::from_path(&path)
                .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))?;
            write_candidates_csv(writer, &response)?;
            println!(
                "Wrote {} candidate row(s) to {}",
                response.hospitals.len(),
                path.display()
            );
        }
        None => {
            let writer = csv::Writer::from_writer(std::io::stdout().lock());
            write_candidates_csv(writer, &response)?;
        }
    }
    Ok(())
}

fn write_candidates_csv<W: Write>(
    mut writer: csv::Writer<W>,
    response: &RoutingResponse,
) -> Result<(), AppError> {
    writer
        .write_record([
            "rank",
            "facility_code",
            "name",
            "priority_score",
            "coverage_level",
            "coverage_score",
            "effective_beds",
            "groups_with_beds",
        ])
        .map_err(csv_io_error)?;

    for (rank, candidate) in response.hospitals.iter().enumerate() {
        writer
            .write_record([
                (rank + 1).to_string(),
                candidate.id.to_string(),
                candidate.name.clone(),
                format!("{:.1}", candidate.priority_score),
                candidate.coverage_level.label().to_string(),
                format!("{:.2}", candidate.coverage_score),
                candidate.total_effective_beds.to_string(),
                candidate
                    .groups_with_beds
                    .iter()
                    .map(|group| group.label())
                    .collect::<Vec<_>>()
                    .join("; "),
            ])
            .map_err(csv_io_error)?;
    }
    writer.flush()?;
    Ok(())
}

fn csv_io_error(err: csv::Error) -> AppError {
    AppError::from(std::io::Error::new(std::io::ErrorKind::Other, err))
}
