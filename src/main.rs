use clap::Parser;
use saju_palja::config::CalcArgs;
use saju_palja::core::fortune::{fortune_flow, BirthChart};
use saju_palja::domain::model::CalendarRecord;
use saju_palja::utils::logger;
use saju_palja::{PaljaCalculator, Result};
use std::io::Write;

fn run(args: &CalcArgs) -> Result<CalendarRecord> {
    let calculator = PaljaCalculator::new();
    let input = args.time_input();
    let calculation = calculator.calculate(&input)?;
    let mut record = calculation.to_record();

    if args.fortune {
        let chart = BirthChart {
            palja: calculation.palja(),
            year: input.year,
            month: input.month,
            day: input.day,
            sex: args.sex,
        };
        record.fortune = Some(fortune_flow(calculator.oracle(), &chart, &args.fortune_request())?);
    }

    Ok(record)
}

fn print_record(record: &CalendarRecord) -> Result<()> {
    let json = serde_json::to_string(record)?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(json.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

fn main() {
    let args = CalcArgs::parse();

    // 初始化日誌 (stderr)
    logger::init_cli_logger(args.verbose);
    tracing::debug!("CLI args: {:?}", args);

    if let Err(e) = run(&args).and_then(|record| print_record(&record)) {
        tracing::debug!(category = ?e.category(), "💡 {}", e.recovery_suggestion());
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
