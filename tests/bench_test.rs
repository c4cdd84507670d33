//! Benchmark tests for critical operations
//!
//! Run with: cargo test --release -- --ignored --nocapture bench

use std::time::Instant;

use axum::extract::{Query, State};
use serde_json::{json, Value};
use tempfile::NamedTempFile;

use movie_catalog::config::Config;
use movie_catalog::database::{init_db, AppState};
use movie_catalog::handler::list_movies;
use movie_catalog::links::normalize;
use movie_catalog::model::ListParams;

/// Benchmark helper to measure execution time
fn benchmark<F>(name: &str, iterations: usize, mut f: F)
where
    F: FnMut(),
{
    let start = Instant::now();

    for _ in 0..iterations {
        f();
    }

    let duration = start.elapsed();
    let avg_ms = duration.as_millis() as f64 / iterations as f64;
    let ops_per_sec = (iterations as f64 / duration.as_secs_f64()) as u64;

    println!("  {} ({} iterations)", name, iterations);
    println!("    Total time: {:?}", duration);
    println!("    Avg time: {:.3}ms", avg_ms);
    println!("    Throughput: {} ops/sec\n", ops_per_sec);
}

fn sample_links(count: usize) -> Value {
    Value::Array(
        (0..count)
            .map(|i| json!({ "label": format!(" Mirror {i} "), "url": format!(" http://files/{i} "), "size": "1GB" }))
            .collect(),
    )
}

#[test]
#[ignore] // Run explicitly with: cargo test bench --release -- --ignored --nocapture
fn bench_normalize_links() {
    println!("\n=== Benchmark: Normalize download links ===\n");

    let array = sample_links(20);
    let encoded = Value::String(array.to_string());

    benchmark("Array payload (20 links)", 10_000, || {
        assert_eq!(normalize(Some(&array)).len(), 20);
    });

    benchmark("JSON string payload (20 links)", 10_000, || {
        assert_eq!(normalize(Some(&encoded)).len(), 20);
    });
}

#[tokio::test]
#[ignore] // Run explicitly with: cargo test bench --release -- --ignored --nocapture
async fn bench_create_and_list_movies() {
    println!("\n=== Benchmark: Create and list movies ===\n");

    let temp_db = NamedTempFile::new().unwrap();
    let db = init_db(temp_db.path().to_str().unwrap()).unwrap();
    let state = AppState::new(db, Config::default());

    let iterations = 500;
    let start = Instant::now();
    for i in 0..iterations {
        let payload = json!({ "movie_name": format!("Bench {i}"), "movie_tags": "a,b,c" });
        let Value::Object(payload) = payload else { unreachable!() };
        state.create_movie(&payload).await.unwrap();
    }
    let duration = start.elapsed();
    println!("  Create ({} iterations)", iterations);
    println!("    Total time: {:?}", duration);
    println!(
        "    Throughput: {} ops/sec\n",
        (iterations as f64 / duration.as_secs_f64()) as u64
    );

    let start = Instant::now();
    for _ in 0..50 {
        let _ = list_movies(State(state.clone()), Query(ListParams::default())).await;
    }
    println!("  List {} movies (50 iterations)", iterations);
    println!("    Total time: {:?}\n", start.elapsed());
}
