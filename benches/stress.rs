use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use tokio_postgres::{Config, NoTls, SimpleQueryMessage};

const HOUR: i64 = 3_600_000; // 1 hour in ms
const BASE: i64 = 4_070_908_800_000; // 2099-01-01 00:00

static NEXT_DB: AtomicU64 = AtomicU64::new(0);

/// A restaurant name no other phase (or earlier run) has used.
fn fresh_db() -> String {
    format!(
        "bench_{}_{}",
        std::process::id(),
        NEXT_DB.fetch_add(1, Ordering::Relaxed)
    )
}

struct Target {
    host: String,
    port: u16,
    password: String,
}

async fn connect(target: &Target, dbname: &str) -> tokio_postgres::Client {
    let mut config = Config::new();
    config
        .host(&target.host)
        .port(target.port)
        .dbname(dbname)
        .user("bench")
        .password(&target.password);

    let (client, conn) = config.connect(NoTls).await.expect("connect failed");
    tokio::spawn(async move {
        if let Err(e) = conn.await {
            eprintln!("connection error: {e}");
        }
    });
    client
}

async fn reserve(client: &tokio_postgres::Client, name: &str, slot: i64) -> u64 {
    client
        .execute(
            &format!("INSERT INTO reservations (name, slot) VALUES ('{name}', {slot})"),
            &[],
        )
        .await
        .unwrap()
}

async fn free_at(client: &tokio_postgres::Client, slot: i64) -> i64 {
    let msgs = client
        .simple_query(&format!("SELECT * FROM free_tables WHERE slot = {slot}"))
        .await
        .unwrap();
    msgs.iter()
        .find_map(|m| match m {
            SimpleQueryMessage::Row(row) => row.get("free").and_then(|f| f.parse().ok()),
            _ => None,
        })
        .expect("free_tables returned no row")
}

fn percentile(sorted: &[Duration], p: f64) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let idx = ((sorted.len() as f64) * p / 100.0) as usize;
    sorted[idx.min(sorted.len() - 1)]
}

fn print_latency(label: &str, latencies: &mut [Duration]) {
    if latencies.is_empty() {
        println!("  {label}: no samples");
        return;
    }
    latencies.sort();
    let total: Duration = latencies.iter().sum();
    let avg = total / latencies.len() as u32;
    println!("  {label}:");
    println!(
        "    n={}, avg={:.2}ms, p50={:.2}ms, p95={:.2}ms, p99={:.2}ms, max={:.2}ms",
        latencies.len(),
        avg.as_secs_f64() * 1000.0,
        percentile(latencies, 50.0).as_secs_f64() * 1000.0,
        percentile(latencies, 95.0).as_secs_f64() * 1000.0,
        percentile(latencies, 99.0).as_secs_f64() * 1000.0,
        latencies[latencies.len() - 1].as_secs_f64() * 1000.0,
    );
}

async fn phase1_sequential(target: &Target) {
    let client = connect(target, &fresh_db()).await;

    let n = 2000;
    let mut latencies = Vec::with_capacity(n);
    let start = Instant::now();

    for i in 0..n {
        let slot = BASE + (i as i64) * HOUR;
        let t = Instant::now();
        reserve(&client, &format!("guest{i}"), slot).await;
        latencies.push(t.elapsed());
    }

    let elapsed = start.elapsed();
    let ops = n as f64 / elapsed.as_secs_f64();
    println!("  {n} reservations in {:.2}s = {ops:.0} ops/sec", elapsed.as_secs_f64());
    print_latency("write latency", &mut latencies);
}

/// Many clients race for the same hour. Exactly `tables` may win.
async fn phase2_dinner_rush(target: &Arc<Target>) {
    let db = Arc::new(fresh_db());
    let probe = connect(target, &db).await;
    let slot = BASE + 18 * HOUR;
    let tables = free_at(&probe, slot).await;

    let n_tasks = 50;
    let attempts_per_task = 20;
    let booked = Arc::new(AtomicU64::new(0));
    let start = Instant::now();
    let mut handles = Vec::new();

    for i in 0..n_tasks {
        let target = target.clone();
        let db = db.clone();
        let booked = booked.clone();
        handles.push(tokio::spawn(async move {
            let client = connect(&target, &db).await;
            for j in 0..attempts_per_task {
                let n = reserve(&client, &format!("rush{i}_{j}"), slot).await;
                booked.fetch_add(n, Ordering::Relaxed);
            }
        }));
    }
    for h in handles {
        h.await.unwrap();
    }

    let elapsed = start.elapsed();
    let booked = booked.load(Ordering::Relaxed);
    let total = n_tasks * attempts_per_task;
    println!(
        "  {n_tasks} tasks x {attempts_per_task} attempts = {total} total in {:.2}s, {booked} booked",
        elapsed.as_secs_f64()
    );
    let left = free_at(&probe, slot).await;
    assert_eq!(booked as i64, tables, "overbooked or lost a reservation");
    assert_eq!(left, 0, "tables left after the rush");
    println!("  no overbooking: {tables} tables, {booked} reservations, {left} free");
}

async fn phase3_read_under_load(target: &Arc<Target>) {
    let db = Arc::new(fresh_db());

    // Pre-fill a day's worth of bookings
    let setup_client = connect(target, &db).await;
    for i in 0..200 {
        reserve(&setup_client, &format!("regular{i}"), BASE + (i % 24) * HOUR).await;
    }
    drop(setup_client);

    let stop = Arc::new(AtomicBool::new(false));
    let mut writer_handles = Vec::new();
    for w in 0..5 {
        let target = target.clone();
        let db = db.clone();
        let stop = stop.clone();
        writer_handles.push(tokio::spawn(async move {
            let client = connect(&target, &db).await;
            let mut i = 0i64;
            while !stop.load(Ordering::Relaxed) {
                let slot = BASE + (24 + (w * 10_000 + i) % 5_000) * HOUR;
                let _ = client
                    .execute(
                        &format!("INSERT INTO reservations (name, slot) VALUES ('w{w}_{i}', {slot})"),
                        &[],
                    )
                    .await;
                i += 1;
            }
        }));
    }

    let n_readers = 10;
    let reads_per_reader = 500;
    let mut reader_handles = Vec::new();
    for r in 0..n_readers {
        let target = target.clone();
        let db = db.clone();
        reader_handles.push(tokio::spawn(async move {
            let client = connect(&target, &db).await;
            let mut latencies = Vec::with_capacity(reads_per_reader);
            for k in 0..reads_per_reader {
                let sql = if (r + k) % 2 == 0 {
                    format!("SELECT * FROM availability WHERE now = {}", BASE + 12 * HOUR)
                } else {
                    format!("SELECT * FROM free_tables WHERE slot = {}", BASE + (k as i64 % 24) * HOUR)
                };
                let t = Instant::now();
                client.simple_query(&sql).await.unwrap();
                latencies.push(t.elapsed());
            }
            latencies
        }));
    }

    let mut all_latencies = Vec::new();
    for h in reader_handles {
        all_latencies.extend(h.await.unwrap());
    }

    stop.store(true, Ordering::Relaxed);
    for h in writer_handles {
        let _ = h.await;
    }

    print_latency("availability / free_tables query", &mut all_latencies);

    let t = Instant::now();
    let counts = connect(target, &db)
        .await
        .simple_query("SELECT * FROM reservation_counts")
        .await
        .unwrap();
    let hours = counts
        .iter()
        .filter(|m| matches!(m, SimpleQueryMessage::Row(_)))
        .count();
    println!(
        "  reservation_counts over {hours} hours in {:.2}ms",
        t.elapsed().as_secs_f64() * 1000.0
    );
}

async fn phase4_connection_storm(target: &Arc<Target>) {
    let n_conns = 50;
    let ops_per_conn = 10;

    let start = Instant::now();
    let mut handles = Vec::new();
    let success = Arc::new(AtomicUsize::new(0));

    for c in 0..n_conns {
        let target = target.clone();
        let success = success.clone();
        handles.push(tokio::spawn(async move {
            let client = connect(&target, &fresh_db()).await;
            for i in 0..ops_per_conn {
                reserve(&client, &format!("storm{c}"), BASE + (i as i64) * HOUR).await;
            }
            client
                .execute(
                    &format!("DELETE FROM reservations WHERE name = 'storm{c}' AND slot = {BASE}"),
                    &[],
                )
                .await
                .unwrap();
            success.fetch_add(1, Ordering::Relaxed);
        }));
    }

    for h in handles {
        let _ = h.await;
    }

    let elapsed = start.elapsed();
    let ok = success.load(Ordering::Relaxed);
    println!(
        "  {n_conns} connections, {ops_per_conn} ops each: {ok}/{n_conns} succeeded in {:.2}s",
        elapsed.as_secs_f64()
    );
}

#[tokio::main]
async fn main() {
    let host = std::env::var("TABLEBOOK_HOST").unwrap_or_else(|_| "127.0.0.1".into());
    let port: u16 = std::env::var("TABLEBOOK_PORT")
        .unwrap_or_else(|_| "5433".into())
        .parse()
        .expect("invalid TABLEBOOK_PORT");
    let password = std::env::var("TABLEBOOK_PASSWORD").unwrap_or_else(|_| "tablebook".into());
    let target = Arc::new(Target { host, port, password });

    println!("=== tablebook stress benchmark ===");
    println!("target: {}:{}\n", target.host, target.port);

    // Each phase uses its own restaurant (fresh dbname) to avoid interference

    println!("[phase 1] sequential reservations");
    phase1_sequential(&target).await;

    println!("\n[phase 2] dinner rush on one hour");
    phase2_dinner_rush(&target).await;

    println!("\n[phase 3] read latency under write load");
    phase3_read_under_load(&target).await;

    println!("\n[phase 4] connection storm");
    phase4_connection_storm(&target).await;

    println!("\n=== benchmark complete ===");
}
