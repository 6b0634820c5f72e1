use chrono::Utc;
use uuid::Uuid;

/// Client-side id for a job the server has not confirmed yet:
/// `tmp-<unix millis>-<8 random hex chars>`.
pub fn temporary_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("tmp-{}-{}", Utc::now().timestamp_millis(), &suffix[..8])
}
