use crate::strategy::BatchConfig;
use crate::types::{Bank, BankAccount, Beneficiary, CnabFormat, DocumentKind};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Write CNAB remessa files, read retorno files and compose boleto barcodes
#[derive(Parser, Debug)]
#[command(name = "cnab")]
#[command(about = "Write CNAB remessa files, read retorno files and compose boleto barcodes", long_about = None)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a remessa file from an instruction CSV
    Remessa(RemessaArgs),
    /// Parse retorno files into an events CSV on stdout
    Retorno(RetornoArgs),
    /// Compose barcodes and digitable lines from an instruction CSV
    Boleto(BoletoArgs),
}

/// Beneficiary account shared by every instruction in the CSV
#[derive(Args, Debug, Clone)]
pub struct AccountArgs {
    /// Bank name or COMPE code
    #[arg(long, value_name = "BANK")]
    pub bank: Bank,

    #[arg(long, value_name = "DIGITS")]
    pub agency: String,

    /// Agency check digit (computed when omitted)
    #[arg(long = "agency-dv", value_name = "DV")]
    pub agency_dv: Option<String>,

    #[arg(long, value_name = "DIGITS")]
    pub account: String,

    /// Account check digit (computed when omitted)
    #[arg(long = "account-dv", value_name = "DV")]
    pub account_dv: Option<String>,

    #[arg(long, value_name = "CODE")]
    pub wallet: String,

    /// Agreement code ("convênio")
    #[arg(long, value_name = "CODE", default_value = "")]
    pub agreement: String,
}

impl AccountArgs {
    pub fn to_account(&self) -> BankAccount {
        BankAccount {
            agency: self.agency.clone(),
            agency_dv: self.agency_dv.clone(),
            account: self.account.clone(),
            account_dv: self.account_dv.clone(),
            wallet: self.wallet.clone(),
            agreement: self.agreement.clone(),
        }
    }
}

#[derive(Args, Debug)]
pub struct RemessaArgs {
    /// Instruction CSV file
    #[arg(value_name = "INPUT")]
    pub input_file: PathBuf,

    #[command(flatten)]
    pub account: AccountArgs,

    /// File format
    #[arg(long, value_name = "FORMAT", default_value = "cnab240")]
    pub format: CnabFormat,

    /// Beneficiary name
    #[arg(long = "company-name", value_name = "NAME")]
    pub company_name: String,

    /// Beneficiary CPF or CNPJ
    #[arg(long = "company-document", value_name = "DOCUMENT")]
    pub company_document: String,

    /// Sequential number of this file
    #[arg(long = "file-sequence", value_name = "N", default_value_t = 1)]
    pub file_sequence: u32,

    /// Generation date (YYYY-MM-DD, default: today)
    #[arg(long, value_name = "DATE")]
    pub date: Option<NaiveDate>,

    /// Output file (default: stdout)
    #[arg(long, short, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl RemessaArgs {
    pub fn to_beneficiary(&self) -> Beneficiary {
        Beneficiary {
            name: self.company_name.clone(),
            document_kind: DocumentKind::infer(&self.company_document),
            document: self.company_document.clone(),
            account: self.account.to_account(),
        }
    }
}

#[derive(Args, Debug)]
pub struct RetornoArgs {
    /// Retorno files; bank and format are detected per file
    #[arg(value_name = "INPUT", required = true)]
    pub input_files: Vec<PathBuf>,

    /// Processing strategy
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "async",
        help = "Processing strategy: 'sync' for sequential or 'async' for parallel"
    )]
    pub strategy: StrategyType,

    /// Maximum number of files parsed concurrently (async mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Maximum number of files parsed concurrently (default: CPU cores)"
    )]
    pub max_concurrent_files: Option<usize>,

    /// Also write every validation warning to this CSV file
    #[arg(long, value_name = "FILE")]
    pub warnings: Option<PathBuf>,

    /// Fail when any file has warnings, stops early or is not recognised
    #[arg(long)]
    pub strict: bool,
}

impl RetornoArgs {
    /// Create a BatchConfig from CLI arguments
    pub fn to_batch_config(&self) -> BatchConfig {
        match self.max_concurrent_files {
            Some(count) => BatchConfig::new(count),
            None => BatchConfig::default(),
        }
    }
}

#[derive(Args, Debug)]
pub struct BoletoArgs {
    /// Instruction CSV file
    #[arg(value_name = "INPUT")]
    pub input_file: PathBuf,

    #[command(flatten)]
    pub account: AccountArgs,
}

/// Available strategies for retorno processing
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const ACCOUNT: [&str; 8] = [
        "--bank", "bradesco", "--agency", "1172", "--account", "403005", "--wallet", "09",
    ];

    fn args(prefix: &[&str], suffix: &[&str]) -> Vec<String> {
        std::iter::once("cnab")
            .chain(prefix.iter().copied())
            .chain(suffix.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_remessa_parsing() {
        let mut argv = args(&["remessa", "in.csv"], &ACCOUNT);
        argv.extend(
            ["--format", "400", "--company-name", "Padaria", "--company-document", "12345678000195"]
                .map(String::from),
        );
        let parsed = CliArgs::try_parse_from(argv).unwrap();
        let Command::Remessa(remessa) = parsed.command else {
            panic!("Expected remessa command");
        };
        assert_eq!(remessa.format, CnabFormat::Cnab400);
        assert_eq!(remessa.account.bank, Bank::Bradesco);
        assert_eq!(remessa.file_sequence, 1);
        assert_eq!(remessa.date, None);

        let beneficiary = remessa.to_beneficiary();
        assert_eq!(beneficiary.document_kind, DocumentKind::Cnpj);
        assert_eq!(beneficiary.account.wallet, "09");
        assert_eq!(beneficiary.account.agency_dv, None);
    }

    #[rstest]
    #[case::default_strategy(&["retorno", "a.ret"], StrategyType::Async)]
    #[case::explicit_sync(&["retorno", "--strategy", "sync", "a.ret", "b.ret"], StrategyType::Sync)]
    fn test_retorno_strategy_parsing(#[case] argv: &[&str], #[case] expected: StrategyType) {
        let parsed = CliArgs::try_parse_from(args(argv, &[])).unwrap();
        let Command::Retorno(retorno) = parsed.command else {
            panic!("Expected retorno command");
        };
        assert_eq!(retorno.strategy, expected);
    }

    #[rstest]
    #[case::defaults(&["retorno", "a.ret"], num_cpus::get())]
    #[case::custom(&["retorno", "--max-concurrent", "3", "a.ret"], 3)]
    #[case::zero_falls_back(&["retorno", "--max-concurrent", "0", "a.ret"], num_cpus::get())]
    fn test_batch_config_conversion(#[case] argv: &[&str], #[case] expected: usize) {
        let parsed = CliArgs::try_parse_from(args(argv, &[])).unwrap();
        let Command::Retorno(retorno) = parsed.command else {
            panic!("Expected retorno command");
        };
        assert_eq!(retorno.to_batch_config().max_concurrent_files, expected);
    }

    #[test]
    fn test_retorno_warning_options() {
        let parsed = CliArgs::try_parse_from(args(
            &["retorno", "a.ret", "--warnings", "warnings.csv", "--strict"],
            &[],
        ))
        .unwrap();
        let Command::Retorno(retorno) = parsed.command else {
            panic!("Expected retorno command");
        };
        assert_eq!(retorno.warnings, Some(PathBuf::from("warnings.csv")));
        assert!(retorno.strict);

        let parsed = CliArgs::try_parse_from(args(&["retorno", "a.ret"], &[])).unwrap();
        let Command::Retorno(retorno) = parsed.command else {
            panic!("Expected retorno command");
        };
        assert_eq!(retorno.warnings, None);
        assert!(!retorno.strict);
    }

    #[rstest]
    #[case::missing_command(&[])]
    #[case::retorno_without_files(&["retorno"])]
    #[case::invalid_strategy(&["retorno", "--strategy", "fast", "a.ret"])]
    #[case::unknown_bank(&["boleto", "in.csv", "--bank", "999", "--agency", "1", "--account", "1", "--wallet", "1"])]
    #[case::invalid_format(&["remessa", "in.csv", "--format", "cnab500"])]
    fn test_parsing_errors(#[case] argv: &[&str]) {
        assert!(CliArgs::try_parse_from(args(argv, &[])).is_err());
    }
}
