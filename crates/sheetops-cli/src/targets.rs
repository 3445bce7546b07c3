use anyhow::{Context, Result, ensure};
use sheetops_extract::HostRecord;
use sheetops_remote::RemoteTarget;
use tracing::info;

/// One target per login/password pair of `host`, all on the same endpoint.
///
/// `password_override` replaces every extracted password when set.
pub fn derive(
    host: &HostRecord,
    default_port: u16,
    password_override: Option<&str>,
) -> Result<Vec<RemoteTarget>> {
    let endpoint = host
        .endpoint(default_port)
        .with_context(|| format!("host address `{}`", host.address))?;
    let credentials = host.credentials();
    ensure!(
        !credentials.is_empty(),
        "no login/password pairs found for {}",
        endpoint.host
    );

    let targets: Vec<RemoteTarget> = credentials
        .into_iter()
        .map(|cred| {
            let password = password_override.map_or(cred.password, str::to_string);
            RemoteTarget::new(endpoint.host.clone(), endpoint.port, cred.user, password)
        })
        .collect();
    info!(host = %endpoint.host, port = endpoint.port, targets = targets.len(), "derived targets");
    Ok(targets)
}
