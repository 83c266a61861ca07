use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow, bail};
use regdesk_service::{PhotoPersist, RegistrationDesk, RegistrationFlow, ServiceError};

/// Splits `field=value`; the value may itself contain `=`.
fn parse_assignment(raw: &str) -> Result<(&str, &str)> {
    raw.split_once('=')
        .filter(|(field, _)| !field.trim().is_empty())
        .map(|(field, value)| (field.trim(), value))
        .ok_or_else(|| anyhow!("expected FIELD=VALUE, got {raw:?}"))
}

fn apply_assignments(flow: &mut RegistrationFlow, sets: &[String]) -> Result<()> {
    for raw in sets {
        let (field, value) = parse_assignment(raw)?;
        flow.set_field(field, value)?;
    }
    Ok(())
}

const fn photo_label(photo: PhotoPersist) -> &'static str {
    match photo {
        PhotoPersist::NotAttached => "none",
        PhotoPersist::Saved => "saved",
        PhotoPersist::Failed => "failed",
    }
}

pub(crate) async fn run_register(
    desk: Arc<RegistrationDesk>,
    sets: &[String],
    photos: Vec<PathBuf>,
) -> Result<()> {
    let mut flow = RegistrationFlow::open(Arc::clone(&desk)).await?;
    apply_assignments(&mut flow, sets)?;
    if !photos.is_empty() && flow.select_photos(photos).await == 0 {
        bail!("none of the photo files could be read");
    }

    let result = flow.submit().await;
    match result {
        Ok(outcome) => {
            if !outcome.photo_saved() {
                eprintln!("Photo could not be stored; the candidate keeps its inline copy");
            }
            let out = serde_json::json!({
                "created": outcome.created,
                "photo": photo_label(outcome.photo),
                "candidate": outcome.candidate,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
            Ok(())
        },
        Err(ServiceError::Validation(errors)) => {
            // Keep what was typed so the next run starts from it.
            desk.drafts().save(flow.form())?;
            flow.close().await;
            for error in errors.iter() {
                eprintln!("{error}");
            }
            bail!("registration rejected: {} invalid field(s), draft kept", errors.len())
        },
        Err(e) => {
            flow.close().await;
            Err(e.into())
        },
    }
}

pub(crate) async fn run_draft(
    desk: Arc<RegistrationDesk>,
    sets: &[String],
    debounce: Duration,
) -> Result<()> {
    let mut flow = RegistrationFlow::open(desk).await?;
    if !sets.is_empty() {
        apply_assignments(&mut flow, sets)?;
        tokio::time::sleep(debounce + Duration::from_millis(100)).await;
    }
    let out = serde_json::json!({
        "editing": flow.is_editing(),
        "form": flow.form(),
    });
    flow.close().await;
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

pub(crate) async fn run_new(desk: Arc<RegistrationDesk>) -> Result<()> {
    let mut flow = RegistrationFlow::open(desk).await?;
    flow.start_new_registration()?;
    flow.close().await;
    println!("Started a new registration");
    Ok(())
}

pub(crate) fn run_session(desk: &RegistrationDesk) -> Result<()> {
    match desk.sessions().find_active_session()? {
        Some(session) => {
            let out = serde_json::json!({
                "candidateId": session.candidate_id,
                "expiresAt": session.expires_at,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        },
        None => println!("No active edit session"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(parse_assignment("name=Ana").unwrap(), ("name", "Ana"));
        assert_eq!(parse_assignment("why=a=b").unwrap(), ("why", "a=b"));
        assert_eq!(parse_assignment("hobbies=").unwrap(), ("hobbies", ""));
        assert!(parse_assignment("name").is_err());
        assert!(parse_assignment("=x").is_err());
    }
}
