use drawit_system::SessionSnapshot;
use tokio::sync::oneshot::Sender;

#[derive(Debug)]
pub enum AdminCommand {
    GetSessionSnapshot { tx: Sender<SessionSnapshot> },
}
