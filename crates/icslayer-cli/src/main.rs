use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use glob::glob;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use icslayer_core::protocols::{ProtocolId, ProtocolLayer, layout_of};
use icslayer_core::stack::LayerStack;
use icslayer_core::{DissectConfig, Report};

#[derive(Parser, Debug)]
#[command(name = "icslayer")]
#[command(version)]
#[command(
    about = "Offline dissector for industrial protocol headers (HART-IP, Modbus/TCP, PN-DCP).",
    long_about = None,
    after_help = "Examples:\n  icslayer pcap dissect capture.pcapng -o report.json\n  icslayer decode modbus 57de00000008ff0f000500010100\n  icslayer layout pndcp"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Operations on PCAP/PCAPNG inputs.
    Pcap {
        #[command(subcommand)]
        command: PcapCommands,
    },
    /// Decode a hex-encoded header and print one summary line per layer.
    #[command(after_help = "Examples:\n  icslayer decode hartip 0100000000020008\n  icslayer decode pndcp 'fe fe 05 00 01 00 00 01 00 01 00 00'")]
    Decode {
        /// Protocol of the first layer (hartip, modbus, pndcp)
        protocol: ProtocolId,

        /// Bytes as hex; spaces, colons and a 0x prefix are ignored
        hex: String,
    },
    /// Print the header field table of one or all protocols.
    Layout {
        /// Protocol to show (default: all)
        protocol: Option<ProtocolId>,
    },
}

#[derive(Subcommand, Debug)]
enum PcapCommands {
    /// Dissect a capture file and generate a versioned JSON report.
    #[command(
        after_help = "Examples:\n  icslayer pcap dissect capture.pcapng -o report.json\n  icslayer pcap dissect 'captures/*.pcap' --stdout --pretty --modbus-port 5020"
    )]
    Dissect {
        /// Path to a .pcap or .pcapng file (a glob matching exactly one file)
        input: PathBuf,

        /// Output report path (JSON)
        #[arg(short = 'o', long, required_unless_present = "stdout")]
        report: Option<PathBuf>,

        /// Write JSON report to stdout
        #[arg(long, conflicts_with = "report")]
        stdout: bool,

        /// Pretty-print JSON output
        #[arg(long, conflicts_with = "compact")]
        pretty: bool,

        /// Compact JSON output (default)
        #[arg(long)]
        compact: bool,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,

        /// Exit with a non-zero code if compliance violations are present
        #[arg(long)]
        strict: bool,

        /// List compliance violations after dissection
        #[arg(long)]
        list_violations: bool,

        /// UDP/TCP port classified as HART-IP
        #[arg(long, value_name = "PORT")]
        hart_ip_port: Option<u16>,

        /// TCP port classified as Modbus/TCP
        #[arg(long, value_name = "PORT")]
        modbus_port: Option<u16>,

        /// Omit the per-packet layer list from the report
        #[arg(long)]
        summary_only: bool,
    },
}

#[derive(Debug)]
struct DissectArgs {
    input: PathBuf,
    report: Option<PathBuf>,
    stdout: bool,
    pretty: bool,
    compact: bool,
    quiet: bool,
    strict: bool,
    list_violations: bool,
    config: DissectConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Pcap { command } => match command {
            PcapCommands::Dissect {
                input,
                report,
                stdout,
                pretty,
                compact,
                quiet,
                strict,
                list_violations,
                hart_ip_port,
                modbus_port,
                summary_only,
            } => {
                let defaults = DissectConfig::default();
                cmd_pcap_dissect(DissectArgs {
                    input,
                    report,
                    stdout,
                    pretty,
                    compact,
                    quiet,
                    strict,
                    list_violations,
                    config: DissectConfig {
                        hart_ip_port: hart_ip_port.unwrap_or(defaults.hart_ip_port),
                        modbus_tcp_port: modbus_port.unwrap_or(defaults.modbus_tcp_port),
                        include_packets: !summary_only,
                    },
                })
            }
        },
        Commands::Decode { protocol, hex } => cmd_decode(protocol, &hex),
        Commands::Layout { protocol } => cmd_layout(protocol),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

/// Logs go to stderr so JSON on stdout stays parseable. `RUST_LOG` wins over
/// `-v`.
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}

fn cmd_pcap_dissect(args: DissectArgs) -> Result<(), CliError> {
    let resolved_input = resolve_input_path(&args.input)?;
    validate_input_file(&resolved_input)?;
    let input_abs = fs::canonicalize(&resolved_input)
        .with_context(|| format!("Failed to resolve input path: {}", resolved_input.display()))?;

    let report_path = match (args.stdout, args.report) {
        (true, _) => None,
        (false, Some(path)) => Some(path),
        (false, None) => {
            return Err(CliError::new(
                "missing output path",
                Some("use -o/--report or --stdout".to_string()),
            ));
        }
    };
    if let Some(path) = report_path.as_deref() {
        ensure_distinct_output(path, &input_abs)?;
    }

    debug!(input = %resolved_input.display(), config = ?args.config, "dissecting");
    let rep = icslayer_core::dissect_capture_file(&resolved_input, &args.config)
        .context("PCAP/PCAPNG dissection failed")?;
    let json = serialize_report(&rep, args.pretty, args.compact)?;

    match report_path {
        None => print!("{}", json),
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create output directory: {}", parent.display())
                    })?;
                }
            }
            fs::write(&path, json)
                .with_context(|| format!("Failed to write report: {}", path.display()))?;
            if !args.quiet {
                eprintln!("OK: report written -> {}", path.display());
            }
        }
    }

    if args.list_violations && !args.quiet {
        print_violations(&rep);
    }
    if args.strict && has_violations(&rep) {
        return Err(CliError::new(
            "compliance violations detected",
            Some("use --list-violations to inspect".to_string()),
        ));
    }
    Ok(())
}

fn ensure_distinct_output(report_path: &Path, input_abs: &Path) -> Result<(), CliError> {
    let parent = match report_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    // A missing parent is created later, so it cannot hold the input.
    let Ok(report_dir) = fs::canonicalize(parent) else {
        return Ok(());
    };
    let file_name = report_path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid report path: {}", report_path.display()))?;
    if report_dir.join(file_name) == input_abs {
        return Err(CliError::new(
            format!(
                "report path must differ from input: {}",
                report_path.display()
            ),
            Some("choose a different output path".to_string()),
        ));
    }
    Ok(())
}

fn cmd_decode(protocol: ProtocolId, hex_input: &str) -> Result<(), CliError> {
    let bytes = parse_hex(hex_input)?;
    let stack = LayerStack::decode_as(&bytes, 0, protocol).map_err(|err| {
        CliError::new(
            format!("cannot decode {} bytes as {protocol}: {err}", bytes.len()),
            protocol
                .fixed_header_len()
                .map(|len| format!("a {protocol} header needs at least {len} bytes")),
        )
    })?;
    for layer in stack.layers() {
        println!("{}", layer.summary());
    }
    Ok(())
}

fn parse_hex(input: &str) -> Result<Vec<u8>, CliError> {
    let trimmed = input.trim();
    let trimmed = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let digits: String = trimmed
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    hex::decode(&digits).map_err(|err| {
        CliError::new(
            format!("invalid hex input: {err}"),
            Some("pass an even number of hex digits, e.g. 0100000000020008".to_string()),
        )
    })
}

fn cmd_layout(protocol: Option<ProtocolId>) -> Result<(), CliError> {
    let protocols = match protocol {
        Some(protocol) => vec![protocol],
        None => ProtocolId::ALL.to_vec(),
    };
    let mut printed = 0;
    for protocol in protocols {
        let Some(fields) = layout_of(protocol) else {
            continue;
        };
        if printed > 0 {
            println!();
        }
        print!("{}", render_layout(protocol, fields));
        printed += 1;
    }
    if printed == 0 {
        return Err(CliError::new(
            "payload has no fixed header layout",
            Some("choose hartip, modbus or pndcp".to_string()),
        ));
    }
    Ok(())
}

fn render_layout(protocol: ProtocolId, fields: &[icslayer_core::wire::FieldDescriptor]) -> String {
    let header_len = protocol.fixed_header_len().unwrap_or_default();
    let name_width = fields
        .iter()
        .map(|field| field.name.len())
        .max()
        .unwrap_or(0)
        .max("field".len());
    let mut out = format!("{protocol} ({header_len} bytes, big-endian)\n");
    out.push_str(&format!("  {:<name_width$}  offset  width\n", "field"));
    for field in fields {
        out.push_str(&format!(
            "  {:<name_width$}  {:>6}  {:>5}\n",
            field.name, field.offset, field.width
        ));
    }
    out
}

fn serialize_report(rep: &Report, pretty: bool, compact: bool) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    if pretty {
        serde_json::to_string_pretty(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn has_violations(rep: &Report) -> bool {
    rep.compliance
        .iter()
        .any(|entry| !entry.violations.is_empty())
}

fn print_violations(rep: &Report) {
    eprintln!("Compliance violations:");
    for entry in &rep.compliance {
        for violation in &entry.violations {
            eprintln!(
                "  {} {} [{}] ({})",
                entry.protocol, violation.id, violation.severity, violation.count
            );
        }
    }
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("use a .pcap or .pcapng file".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("use a .pcap or .pcapng file".to_string()),
        ));
    }
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext != "pcap" && ext != "pcapng" {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some("expected a .pcap or .pcapng file".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    let mut matches = Vec::new();
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    match matches.len() {
        0 => Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern; expected .pcap or .pcapng".to_string()),
        )),
        1 => Ok(matches.remove(0)),
        count => {
            let listed = matches
                .iter()
                .take(3)
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            let more = if count > 3 { ", ..." } else { "" };
            Err(CliError::new(
                format!("multiple files match pattern '{pattern}' ({count} matches); matches: {listed}{more}"),
                Some("pass a single capture file, or run once per file".to_string()),
            ))
        }
    }
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}

#[cfg(test)]
mod tests {
    use super::{is_glob_pattern, parse_hex, render_layout};
    use icslayer_core::protocols::{ProtocolId, layout_of};

    #[test]
    fn hex_accepts_separators_and_prefix() {
        assert_eq!(parse_hex("0x01 00:0d").unwrap(), [0x01, 0x00, 0x0d]);
        assert!(parse_hex("abc").is_err());
        assert!(parse_hex("zz").is_err());
    }

    #[test]
    fn layout_table_lists_every_field() {
        let fields = layout_of(ProtocolId::HartIp).unwrap();
        let table = render_layout(ProtocolId::HartIp, fields);
        assert!(table.starts_with("HART-IP (8 bytes, big-endian)\n"));
        assert_eq!(table.lines().count(), 2 + fields.len());
        assert!(table.contains("sequence_number"));
    }

    #[test]
    fn glob_detection() {
        assert!(is_glob_pattern("captures/*.pcap"));
        assert!(!is_glob_pattern("capture.pcapng"));
    }
}
