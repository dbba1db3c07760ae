use std::path::PathBuf;

use nagrik_core::models::{GeoPoint, IssueCategory};
use nagrik_core::services::{ReportComposer, ReportForm, Submission};

use crate::commands::common::{detect_connectivity, open_engine, resolve_description, AppContext};
use crate::error::CliError;

pub struct ReportArgs {
    pub category: IssueCategory,
    pub title: Option<String>,
    pub location: Option<GeoPoint>,
    pub address: Option<String>,
    pub photos: Vec<PathBuf>,
    pub voice_note: Option<PathBuf>,
    pub description: Vec<String>,
}

pub async fn run_report(context: &AppContext, args: ReportArgs) -> Result<Submission, CliError> {
    let form = ReportForm {
        category: Some(args.category),
        title: args.title,
        description: resolve_description(&args.description)?,
        location: args.location,
        address: args.address,
        photos: args.photos,
        voice_note: args.voice_note,
    };

    let engine = open_engine(context).await?;
    let connectivity = detect_connectivity(engine.delivery(), context.force_offline).await;
    let submission = ReportComposer::new(engine).submit(form, connectivity).await?;

    match &submission {
        Submission::Delivered(id) => println!("Report submitted: {id}"),
        Submission::Queued(id) => {
            println!("Saved offline: {id}");
            println!("It will be submitted automatically when you're back online.");
        }
    }
    Ok(submission)
}
