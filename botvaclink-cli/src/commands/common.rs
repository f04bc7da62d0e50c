//! Shared connection plumbing for the subcommands.

use crate::error::CliError;
use botvaclink::auth::AccessToken;
use botvaclink::beehive::BeehiveClient;
use botvaclink::cache::StateCache;
use botvaclink::config::Settings;
use botvaclink::controller::RobotController;
use botvaclink::http::ReqwestClient;
use botvaclink::nucleo::NucleoClient;
use botvaclink::robot::RobotIdentity;
use std::sync::Arc;
use tracing::debug;

/// An authenticated connection to one robot.
pub struct Bridge {
    pub settings: Settings,
    pub identity: RobotIdentity,
    pub controller: RobotController<NucleoClient<ReqwestClient>>,
}

/// Resolves an account token from the environment.
///
/// `NEATO_TOKEN` wins; otherwise `NEATO_EMAIL`/`NEATO_PASSWORD` drive a
/// session login.
pub async fn access_token(
    beehive: &BeehiveClient<ReqwestClient>,
) -> Result<AccessToken, CliError> {
    if let Ok(token) = std::env::var("NEATO_TOKEN") {
        debug!("using token from NEATO_TOKEN");
        return Ok(AccessToken::new(token, None));
    }

    match (std::env::var("NEATO_EMAIL"), std::env::var("NEATO_PASSWORD")) {
        (Ok(email), Ok(password)) => Ok(beehive.login(&email, &password).await?),
        _ => Err(CliError::MissingCredentials),
    }
}

/// Authenticates, discovers the robot and builds a controller for it.
pub async fn connect(settings: Settings, serial: Option<&str>) -> Result<Bridge, CliError> {
    let http = ReqwestClient::with_timeout(settings.request_timeout_secs)?;
    let beehive = BeehiveClient::new(http.clone());

    let token = access_token(&beehive).await?;
    let wanted = serial.or(settings.robot_serial.as_deref());
    let identity = beehive.find_robot(&token, wanted).await?;

    let api = Arc::new(NucleoClient::new(http, identity.clone()));
    let cache = Arc::new(StateCache::new(api));

    Ok(Bridge {
        settings,
        identity,
        controller: RobotController::new(cache),
    })
}

/// Lists robots without selecting one.
pub async fn list_robots(settings: &Settings) -> Result<Vec<RobotIdentity>, CliError> {
    let http = ReqwestClient::with_timeout(settings.request_timeout_secs)?;
    let beehive = BeehiveClient::new(http);
    let token = access_token(&beehive).await?;
    let robots = beehive
        .list_robots(&token)
        .await
        .map_err(|e| CliError::Discovery(e.into()))?;
    Ok(robots)
}
