use std::net::{Ipv4Addr, SocketAddrV4, UdpSocket};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use dhcpwire::transport::{interface_index, interface_mac};
use dhcpwire::{
    Config, DhcpMessage, Error, KernelTransport, MessageType, RawTransport, Result, Transport,
    recv_message,
};

#[derive(Parser)]
#[command(name = "dhcpwire")]
#[command(author, version, about = "BOOTP/DHCP packet transport diagnostics", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Discover {
        #[arg(long)]
        wait: bool,
    },
    Inform {
        #[arg(long)]
        ciaddr: Option<Ipv4Addr>,
    },
    Listen,
    ShowConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    let config = Config::load_or_create(&cli.config)?;

    match cli.command {
        Commands::Discover { wait } => discover(&config, wait),
        Commands::Inform { ciaddr } => inform(&config, ciaddr),
        Commands::Listen => listen(&config),
        Commands::ShowConfig => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

/// Display label for a message, falling back for plain BOOTP.
fn type_label(message: &DhcpMessage) -> String {
    message
        .message_type()
        .map(|message_type| message_type.to_string())
        .unwrap_or_else(|| "BOOTP".to_string())
}

fn transmit(transport: &dyn Transport, message: &DhcpMessage) -> Result<usize> {
    let sent = transport.send(message)?;
    info!(bytes = sent, xid = message.xid, "transmitted {}", type_label(message));
    Ok(sent)
}

fn discover(config: &Config, wait: bool) -> Result<()> {
    let ifindex = interface_index(&config.interface)?;
    let mac = interface_mac(&config.interface)?;

    let mut message = DhcpMessage::new(MessageType::Discover);
    message.xid = rand::random();
    message.chaddr[..6].copy_from_slice(&mac);

    // Bind before transmitting so an immediate reply is not lost.
    let listener = if wait {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, config.client_port))?;
        socket.set_read_timeout(Some(Duration::from_secs(5)))?;
        Some(socket)
    } else {
        None
    };

    let transport = RawTransport::new(
        SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, config.client_port),
        SocketAddrV4::new(Ipv4Addr::BROADCAST, config.server_port),
        [0xff; 6],
        ifindex,
    );
    transmit(&transport, &message)?;

    if let Some(socket) = listener {
        let reply = loop {
            match recv_message(&socket, &config.broken_vendors) {
                Ok(reply) if reply.xid == message.xid => break reply,
                Ok(reply) => {
                    debug!(xid = reply.xid, "ignoring reply for another transaction");
                }
                Err(Error::InvalidCookie(_)) => {}
                Err(error) => return Err(error),
            }
        };

        info!(
            "{} from {} (yiaddr {}, siaddr {})",
            type_label(&reply),
            reply.format_mac(),
            reply.yiaddr,
            reply.siaddr
        );
    }

    Ok(())
}

fn inform(config: &Config, ciaddr: Option<Ipv4Addr>) -> Result<()> {
    let server_ip = config.server_ip.ok_or_else(|| {
        Error::InvalidConfig("server_ip must be set to send INFORM".to_string())
    })?;
    let mac = interface_mac(&config.interface)?;
    let source_ip = ciaddr.unwrap_or(Ipv4Addr::UNSPECIFIED);

    let mut message = DhcpMessage::new(MessageType::Inform);
    message.xid = rand::random();
    message.ciaddr = source_ip;
    message.chaddr[..6].copy_from_slice(&mac);

    let transport = KernelTransport::new(
        SocketAddrV4::new(source_ip, config.client_port),
        SocketAddrV4::new(server_ip, config.server_port),
    );
    transmit(&transport, &message)?;

    Ok(())
}

fn listen(config: &Config) -> Result<()> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, config.server_port))?;
    info!(port = config.server_port, "listening for DHCP messages");

    loop {
        match recv_message(&socket, &config.broken_vendors) {
            Ok(message) => {
                info!(
                    "{} from {} (xid {:#010x}, broadcast {})",
                    type_label(&message),
                    message.format_mac(),
                    message.xid,
                    message.is_broadcast()
                );
            }
            Err(Error::InvalidCookie(_)) => {}
            Err(error) => return Err(error),
        }
    }
}
