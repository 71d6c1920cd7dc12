use clap::Parser;
use drawit_system::coordinator::QuorumPolicy;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "drawit-server", about = "Relay server for the draw-and-vote game")]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Directory with the browser sketches
    #[arg(long, env = "STATIC_DIR", default_value = "public")]
    pub static_dir: PathBuf,

    /// Which connections must vote before voting is done: `live` or `joined`
    #[arg(long, env = "VOTE_QUORUM", default_value = "live")]
    pub quorum: QuorumPolicy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_parses_quorum_policy() {
        let config = ServerConfig::try_parse_from([
            "drawit-server",
            "--quorum",
            "joined",
            "--port",
            "8080",
            "--static-dir",
            "sketches",
        ])
        .expect("");
        assert_eq!(config.quorum, QuorumPolicy::Joined);
        assert_eq!(config.port, 8080);
        assert_eq!(config.static_dir, PathBuf::from("sketches"));
        assert!(ServerConfig::try_parse_from(["drawit-server", "--quorum", "all"]).is_err());
    }
}
