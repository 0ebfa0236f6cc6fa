//! rfmseg: customer segmentation over e-commerce orders using RFM analysis
//!
//! This is the main entrypoint that orchestrates data loading, filtering,
//! scoring, reporting and export.

use anyhow::Result;
use clap::Parser;
use rfmseg::{
    compute_rfm, into_records, load_orders_file, logging, render_summary, report, summarize,
    top_customers, write_csv_file, Args,
};
use std::time::Instant;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();
    logging::init_logging(args.verbose);

    if args.verbose {
        println!("rfmseg - Customer Segmentation using RFM Analysis");
        println!("==================================================\n");
    }

    run_pipeline(&args)
}

/// Run the load -> filter -> score -> report pipeline
fn run_pipeline(args: &Args) -> Result<()> {
    let start_time = Instant::now();

    let snapshot = args.snapshot()?;
    let filter = args.filter()?;

    // Step 1: Load order rows
    if args.verbose {
        println!("Step 1: Loading order data");
        println!("  Input file: {}", args.input);
    }

    let data_start = Instant::now();
    let rows = load_orders_file(&args.input)?;
    println!("✓ Data loaded: {} order rows", rows.len());
    if args.verbose {
        println!("  Loading time: {:.2}s", data_start.elapsed().as_secs_f64());
    }

    // Step 2: Apply date range and category filters
    let rows = if filter.is_empty() {
        rows
    } else {
        if args.verbose {
            println!("\nStep 2: Filtering orders");
            println!("  Start date: {:?}", filter.start);
            println!("  End date: {:?}", filter.end);
            println!("  Categories: {:?}", filter.categories);
        }
        let filtered = filter.apply(&rows);
        println!("✓ Filter applied: {} order rows remain", filtered.len());
        filtered
    };

    // Step 3: Score customers
    if args.verbose {
        println!("\nStep 3: Computing RFM scores");
        match snapshot {
            Some(snapshot) => println!("  Snapshot date: {}", snapshot),
            None => println!("  Snapshot date: latest purchase"),
        }
    }

    let score_start = Instant::now();
    let records = into_records(rows);
    let mut customers = compute_rfm(&records, snapshot)?;
    println!("✓ Scored {} customers", customers.len());
    if args.verbose {
        println!("  Scoring time: {:.2}s", score_start.elapsed().as_secs_f64());
    }

    // Step 4: Report
    println!("\n=== Customer Segments ===");
    print!("{}", render_summary(&summarize(&customers)));

    if args.top > 0 {
        println!("\n=== Top {} Customers ===", args.top);
        for customer in top_customers(&customers, args.top) {
            println!(
                "{}  RFM={} score={} ({}) recency={}d orders={} spent={:.2}",
                customer.customer_unique_id,
                customer.rfm_code,
                customer.rfm_score,
                customer.segment,
                customer.recency,
                customer.frequency,
                customer.monetary
            );
        }
    }

    // Step 5: Export
    if let Some(ref output) = args.output {
        customers.sort_by(report::by_segment);
        write_csv_file(&customers, output)?;
        println!("\n✓ RFM table saved to: {}", output);
    }

    println!("\n=== Pipeline Complete ===");
    println!(
        "Total processing time: {:.2}s",
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}
