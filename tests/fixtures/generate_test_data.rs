// ==========================================
// 测试数据生成器
// ==========================================
// 用途: 生成一套可直接被 cauldron-aps 读取的目录数据集
// 输出: {out_dir}/data.json, tickets.csv, cauldrons.json, network.json, couriers.json
// 用法: generate_test_data [out_dir]（默认 tests/fixtures/datasets/demo）
// ==========================================

use chrono::{DateTime, Duration, TimeZone, Utc};
use csv::Writer;
use serde_json::{json, Value};
use std::error::Error;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

// 采样间隔（分钟）
const SAMPLE_INTERVAL_MIN: i64 = 1;
// 采样天数
const DAYS: i64 = 2;
// 市场节点
const MARKET: &str = "market_001";

// 坩埚定义: (id, 名称, 容量, 注入速率/分钟, 初始液位)
const CAULDRONS: &[(&str, &str, f64, f64, f64)] = &[
    ("cauldron_001", "Crimson Brew", 1000.0, 1.2, 300.0),
    ("cauldron_002", "Azure Tonic", 800.0, 0.8, 200.0),
    ("cauldron_003", "Verdant Draught", 1200.0, 1.5, 500.0),
    ("cauldron_004", "Golden Elixir", 600.0, 0.6, 100.0),
    ("cauldron_005", "Shadow Essence", 900.0, 1.0, 450.0),
];

// 排液计划: 每只坩埚每隔多少分钟排液一次
const DRAIN_EVERY_MIN: i64 = 420;
// 排液持续时间（分钟）
const DRAIN_DURATION_MIN: i64 = 10;
// 排液速率（单位/分钟）
const DRAIN_RATE: f64 = 30.0;

// 单次排液记录
struct DrainRecord {
    cauldron_id: String,
    time_start: DateTime<Utc>,
    collected: f64,
}

fn main() -> Result<(), Box<dyn Error>> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("tests/fixtures/datasets/demo"));
    fs::create_dir_all(&out_dir)?;

    println!("开始生成测试数据集: {}", out_dir.display());

    let t0 = Utc.with_ymd_and_hms(2025, 10, 30, 0, 0, 0).single().ok_or("起始时间非法")?;

    // 1. 液位序列 + 排液记录
    let drains = generate_levels(&out_dir, t0)?;

    // 2. 工单（含体积偏差、隔日上报、幽灵工单、漏报）
    generate_tickets(&out_dir, &drains)?;

    // 3. 坩埚元数据
    generate_cauldrons(&out_dir)?;

    // 4. 运输网络
    generate_network(&out_dir)?;

    // 5. 收集员
    generate_couriers(&out_dir)?;

    println!("✓ 所有测试数据生成完成！");
    Ok(())
}

fn generate_levels(out_dir: &Path, t0: DateTime<Utc>) -> Result<Vec<DrainRecord>, Box<dyn Error>> {
    let total_steps = DAYS * 24 * 60 / SAMPLE_INTERVAL_MIN;
    let mut levels: Vec<f64> = CAULDRONS.iter().map(|c| c.4).collect();
    let mut drains = Vec::new();
    let mut records: Vec<Value> = Vec::with_capacity(total_steps as usize);

    for step in 0..=total_steps {
        let minute = step * SAMPLE_INTERVAL_MIN;
        let timestamp = t0 + Duration::minutes(minute);
        let mut snapshot = serde_json::Map::new();

        for (idx, (id, _, max_volume, fill_rate, _)) in CAULDRONS.iter().enumerate() {
            // 错开各坩埚的排液时间
            let offset = (minute + idx as i64 * 60) % DRAIN_EVERY_MIN;
            if step > 0 {
                levels[idx] += fill_rate * SAMPLE_INTERVAL_MIN as f64;
                if minute >= DRAIN_EVERY_MIN && offset < DRAIN_DURATION_MIN {
                    levels[idx] -= DRAIN_RATE * SAMPLE_INTERVAL_MIN as f64;
                }
                levels[idx] = levels[idx].clamp(0.0, *max_volume);
            }
            if minute >= DRAIN_EVERY_MIN && offset == 0 {
                drains.push(DrainRecord {
                    cauldron_id: id.to_string(),
                    time_start: timestamp,
                    collected: DRAIN_RATE * DRAIN_DURATION_MIN as f64,
                });
            }
            snapshot.insert(id.to_string(), json!((levels[idx] * 100.0).round() / 100.0));
        }

        records.push(json!({
            "timestamp": timestamp.to_rfc3339(),
            "cauldron_levels": Value::Object(snapshot),
        }));
    }

    let path = out_dir.join("data.json");
    fs::write(&path, serde_json::to_string_pretty(&records)?)?;
    println!("✓ 生成 data.json ({}条读数记录, {}次排液)", records.len(), drains.len());
    Ok(drains)
}

fn generate_tickets(out_dir: &Path, drains: &[DrainRecord]) -> Result<(), Box<dyn Error>> {
    let file = File::create(out_dir.join("tickets.csv"))?;
    let mut wtr = Writer::from_writer(file);
    wtr.write_record(["ticket_id", "cauldron_id", "courier_id", "date", "amount_collected"])?;

    let mut count = 0;
    for (i, drain) in drains.iter().enumerate() {
        // 每 7 次排液漏报一次
        if i % 7 == 6 {
            continue;
        }
        let mut date = drain.time_start.date_naive();
        let mut amount = drain.collected;
        match i % 5 {
            // 隔日上报
            1 => date += Duration::days(1),
            // 少报
            3 => amount *= 0.7,
            _ => {}
        }
        count += 1;
        wtr.write_record([
            format!("TT_{:04}", count),
            drain.cauldron_id.clone(),
            format!("courier_{:03}", i % 3 + 1),
            date.format("%Y-%m-%d").to_string(),
            format!("{:.2}", amount),
        ])?;
    }

    // 幽灵工单
    count += 1;
    wtr.write_record([
        format!("TT_{:04}", count),
        "cauldron_004".to_string(),
        "courier_002".to_string(),
        "2025-10-30".to_string(),
        "120.00".to_string(),
    ])?;

    wtr.flush()?;
    println!("✓ 生成 tickets.csv ({}条)", count);
    Ok(())
}

fn generate_cauldrons(out_dir: &Path) -> Result<(), Box<dyn Error>> {
    let cauldrons: Vec<Value> = CAULDRONS
        .iter()
        .map(|(id, name, max_volume, _, _)| {
            json!({ "id": id, "name": name, "max_volume": max_volume })
        })
        .collect();
    fs::write(out_dir.join("cauldrons.json"), serde_json::to_string_pretty(&cauldrons)?)?;
    println!("✓ 生成 cauldrons.json ({}只坩埚)", cauldrons.len());
    Ok(())
}

fn generate_network(out_dir: &Path) -> Result<(), Box<dyn Error>> {
    let mut edges = Vec::new();
    for (idx, (id, ..)) in CAULDRONS.iter().enumerate() {
        let to_market = 8.0 + idx as f64 * 3.0;
        edges.push(json!({ "from": id, "to": MARKET, "travel_time_minutes": to_market }));
        edges.push(json!({ "from": MARKET, "to": id, "travel_time_minutes": to_market }));

        // 相邻坩埚互通
        if let Some((next, ..)) = CAULDRONS.get(idx + 1) {
            edges.push(json!({ "from": id, "to": next, "travel_time_minutes": 6.0 }));
            edges.push(json!({ "from": next, "to": id, "travel_time_minutes": 6.0 }));
        }
    }
    let document = json!({ "edges": edges });
    fs::write(out_dir.join("network.json"), serde_json::to_string_pretty(&document)?)?;
    println!("✓ 生成 network.json ({}条边)", edges.len());
    Ok(())
}

fn generate_couriers(out_dir: &Path) -> Result<(), Box<dyn Error>> {
    let couriers = json!([
        { "courier_id": "courier_001", "name": "Mira", "max_carrying_capacity": 400 },
        { "courier_id": "courier_002", "name": "Tobin", "max_carrying_capacity": 350 },
        { "id": "courier_003", "capacity": "300" },
    ]);
    fs::write(out_dir.join("couriers.json"), serde_json::to_string_pretty(&couriers)?)?;
    println!("✓ 生成 couriers.json (3名收集员)");
    Ok(())
}
