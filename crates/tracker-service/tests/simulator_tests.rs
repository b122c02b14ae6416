//! Traffic simulator integration tests.
//!
//! Run simulator calls against a `TestTrackerServer`.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use tracker_service::simulator::{Action, Simulator, SimulatorError};
use tracker_test_utils::TestTrackerServer;

#[tokio::test]
async fn test_update_then_query_episode() -> Result<(), anyhow::Error> {
    let server = TestTrackerServer::spawn().await?;
    let simulator = Simulator::new(server.api_url())?;

    simulator.update_episode("charlie", "Lost", 4, 11).await?;

    let episode = simulator.query_episode("charlie", "Lost").await?;
    let episode = episode.expect("episode should exist after update");
    assert_eq!(episode.season, 4);
    assert_eq!(episode.episode, 11);

    assert_eq!(simulator.query_user("charlie").await?, 1);
    assert_eq!(simulator.query_all().await?, 1);

    Ok(())
}

#[tokio::test]
async fn test_missing_episode_is_not_a_failure() -> Result<(), anyhow::Error> {
    let server = TestTrackerServer::spawn().await?;
    let simulator = Simulator::new(server.api_url())?;

    assert!(simulator.query_episode("eve", "Friends").await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_every_action_succeeds_against_live_server() -> Result<(), anyhow::Error> {
    let server = TestTrackerServer::spawn().await?;
    let simulator = Simulator::new(server.api_url())?;

    for action in [
        Action::UpdateEpisode,
        Action::QueryAll,
        Action::QueryUser,
        Action::QueryEpisode,
    ] {
        simulator.run(action).await?;
    }
    assert_eq!(server.backend().len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_server_error_is_reported() -> Result<(), anyhow::Error> {
    let server = TestTrackerServer::spawn().await?;
    server.backend().set_unavailable(true);
    let simulator = Simulator::new(server.api_url())?;

    let result = simulator.query_all().await;
    assert!(matches!(
        result,
        Err(SimulatorError::UnexpectedStatus(status)) if status.as_u16() == 500
    ));

    Ok(())
}
