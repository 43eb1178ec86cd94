//! Benchmark suite for writing and reading CNAB files
//!
//! Uses the divan benchmarking framework.
//!
//! # Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench
//! ```
//!
//! Files are generated in memory (and in temporary files for the strategy
//! benchmarks) with 100, 1,000 and 10,000 charges.

use chrono::NaiveDate;
use divan::Bencher;
use rust_cnab_engine::cli::StrategyType;
use rust_cnab_engine::strategy::{create_strategy, BatchConfig};
use rust_cnab_engine::types::{movement, BankAccount, Beneficiary, DocumentKind, Payer};
use rust_cnab_engine::{
    write_remessa, Bank, BarcodeComposer, CnabFormat, Lote, PaymentInstruction, RemessaHeader,
    RetornoParser,
};
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

const SIZES: [usize; 3] = [100, 1_000, 10_000];
const FORMATS: [CnabFormat; 2] = [CnabFormat::Cnab240, CnabFormat::Cnab400];

fn main() {
    divan::main();
}

fn account() -> BankAccount {
    BankAccount {
        agency: "1172".to_string(),
        account: "403005".to_string(),
        wallet: "09".to_string(),
        ..BankAccount::default()
    }
}

fn header() -> RemessaHeader {
    RemessaHeader {
        beneficiary: Beneficiary {
            name: "Padaria Sao Jose".to_string(),
            document_kind: DocumentKind::Cnpj,
            document: "12345678000195".to_string(),
            account: account(),
        },
        file_sequence: 1,
        generated_on: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
    }
}

fn charges(count: usize) -> Vec<Lote> {
    let date = NaiveDate::from_ymd_opt(2024, 4, 10).unwrap();
    let instructions = (1..=count)
        .map(|n| PaymentInstruction {
            account: account(),
            document_number: format!("NF{}", n),
            our_number: n.to_string(),
            due_date: date,
            issue_date: date,
            value: (n as i64) * 137,
            payer: Payer {
                document_kind: DocumentKind::Cpf,
                document: "12345678909".to_string(),
                name: "Maria Souza".to_string(),
                address: "Rua A, 1".to_string(),
                neighborhood: "Centro".to_string(),
                zip_code: "01310100".to_string(),
                city: "Sao Paulo".to_string(),
                state: "SP".to_string(),
            },
            movement_code: movement::REGISTER,
            fine: None,
            our_number_dv: None,
            barcode: None,
        })
        .collect();
    vec![Lote::new(instructions)]
}

fn file_bytes(format: CnabFormat, count: usize) -> Vec<u8> {
    write_remessa(Bank::Bradesco, format, header(), &charges(count))
        .expect("Writing failed")
        .to_bytes()
}

/// Write a remessa file
#[divan::bench(consts = SIZES, args = FORMATS)]
fn write<const N: usize>(bencher: Bencher, format: CnabFormat) {
    let lotes = charges(N);
    bencher.bench_local(|| {
        write_remessa(Bank::Bradesco, format, header(), divan::black_box(&lotes))
            .expect("Writing failed")
    });
}

/// Parse a file, validating every trailer
#[divan::bench(consts = SIZES, args = FORMATS)]
fn parse<const N: usize>(bencher: Bencher, format: CnabFormat) {
    let bytes = file_bytes(format, N);
    let parser = RetornoParser::new(Bank::Bradesco, format).expect("Unsupported layout");
    bencher.bench_local(|| parser.parse(divan::black_box(&bytes)).expect("Parsing failed"));
}

/// Compose barcode and digitable line for every charge
#[divan::bench(consts = SIZES)]
fn boletos<const N: usize>(bencher: Bencher) {
    let lotes = charges(N);
    let composer = BarcodeComposer::new(Bank::Bradesco);
    bencher.bench_local(|| {
        for instruction in &lotes[0].instructions {
            let barcode = composer.compose(instruction).expect("Composition failed");
            divan::black_box(barcode.digitable_line());
        }
    });
}

fn temp_files(count: usize) -> Vec<NamedTempFile> {
    (0..8)
        .map(|_| {
            let mut file = NamedTempFile::new().expect("Failed to create temp file");
            file.write_all(&file_bytes(CnabFormat::Cnab240, count))
                .expect("Failed to write temp file");
            file
        })
        .collect()
}

/// Process eight retorno files with each strategy
#[divan::bench(args = [StrategyType::Sync, StrategyType::Async])]
fn strategies(bencher: Bencher, strategy_type: StrategyType) {
    let files = temp_files(1_000);
    let paths: Vec<PathBuf> = files.iter().map(|f| f.path().to_path_buf()).collect();
    let strategy = create_strategy(strategy_type, Some(BatchConfig::default()));
    bencher.bench_local(|| {
        let mut output = Vec::new();
        strategy
            .process(&paths, &mut output)
            .expect("Processing failed");
        output
    });
}
