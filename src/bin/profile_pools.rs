#![allow(dead_code, unused_imports)]

use archetype_core::download::{
    DownloadConfig, DownloadManager, DownloadRequest, DownloadTransport, RecordingSubscriber,
};
use archetype_core::object_pool::{ObjectPoolManager, PoolConfig, Poolable};
use archetype_core::{ModuleRegistry, Result, Time};
use std::{fs::File, time::Duration, time::Instant};

#[cfg(feature = "profiling")]
use tracing_subscriber::{self, prelude::*};

#[derive(Debug, Clone)]
struct Projectile(u32);

impl Poolable for Projectile {}

/// Answers every request synchronously with a fixed body
struct LoopbackTransport {
    body: Vec<u8>,
}

impl DownloadTransport for LoopbackTransport {
    fn download(&mut self, request: DownloadRequest) -> Result<()> {
        let offset = request.from_position.unwrap_or(0) as usize;
        let body = &self.body[offset.min(self.body.len())..];
        for part in body.chunks(4096) {
            request.sink.bytes(part.to_vec());
            request.sink.length(part.len() as u64);
        }
        request.sink.complete(body.len() as u64);
        Ok(())
    }

    fn reset(&mut self) {}
}

#[cfg(feature = "profiling")]
#[tracing::instrument(skip(registry))]
fn profile_frames(registry: &mut ModuleRegistry, frames: usize) -> Result<()> {
    let mut time = Time::new();
    for frame in 0..frames {
        if frame % 100 == 0 {
            tracing::info!("Frame {}/{}", frame, frames);
        }
        if let Some(pools) = registry.get_mut::<ObjectPoolManager>() {
            if let Some(pool) = pools.pool_mut::<Projectile>("projectiles") {
                for i in 0..32u32 {
                    pool.register(format!("p{}", i % 8), Projectile(i), false)?;
                }
            }
        }
        registry.tick(&mut time, Duration::from_millis(16))?;
    }
    Ok(())
}

#[cfg(feature = "profiling")]
fn main() -> Result<()> {
    // Set up tracing subscriber to write to a file
    let file = File::create("trace.json")?;
    let (non_blocking, _guard) = tracing_appender::non_blocking(file);
    tracing_subscriber::fmt()
        .json()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_max_level(tracing::Level::TRACE)
        .init();

    let mut registry = ModuleRegistry::new();
    registry
        .register(ObjectPoolManager::new())?
        .create_multi_spawn_pool::<Projectile>(
            PoolConfig::new("projectiles")
                .with_capacity(256)
                .with_expire_time(0.5)
                .with_auto_release_interval(0.1),
        )?;

    let downloads = registry.register(DownloadManager::new(DownloadConfig::default())?)?;
    downloads.subscribe(RecordingSubscriber::new());
    downloads.add_agent(Box::new(LoopbackTransport {
        body: vec![0u8; 1 << 20],
    }))?;
    let target = std::env::temp_dir().join("profile_pools").join("payload.bin");
    downloads.add_download(&target, "loopback://payload")?;

    println!("Profiling 1000 frames...");
    let start = Instant::now();
    profile_frames(&mut registry, 1_000)?;
    println!("1000 frames complete in: {:?}", start.elapsed());

    registry.shutdown();
    Ok(())
}

#[cfg(not(feature = "profiling"))]
fn main() {
    println!("profile_pools binary requires --features profiling");
}
