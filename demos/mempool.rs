use std::{io::Read, ptr::NonNull};

use rmempool::{Mempool, PoolConfig};

const CONFIG: &str = r#"
alignment = 2048

[[size_classes]]
chunk_size = 8
chunk_count = 20

[[size_classes]]
chunk_size = 16
chunk_count = 15

[[size_classes]]
chunk_size = 32
chunk_count = 10
"#;

/// Waits until the user presses ENTER.
/// Handy for attaching `gdb` or inspecting the process between steps.
fn block_until_enter_pressed() {
  println!("\n>>> Press ENTER to continue...");
  if let Some(Err(err)) = std::io::stdin().bytes().next() {
    eprintln!("could not read stdin: {err}");
  }
}

fn print_alloc(
  pool: &Mempool,
  size: usize,
  chunk: Option<NonNull<u8>>,
) {
  match chunk {
    Some(chunk) => println!(
      "Requested {} bytes, got a {} byte chunk at {:?}",
      size,
      pool.chunk_size_of(chunk.as_ptr()).unwrap_or(0),
      chunk
    ),
    None => println!("Requested {} bytes, pool has nothing left that fits", size),
  }
}

fn main() {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

  let config = match PoolConfig::from_toml_str(CONFIG) {
    Ok(config) => config,
    Err(err) => {
      eprintln!("bad pool config: {err}");
      return;
    }
  };

  let pool = match Mempool::from_config(&config) {
    Ok(pool) => pool,
    Err(err) => {
      eprintln!("could not build pool: {err}");
      return;
    }
  };

  println!(
    "Pool ready: {} byte arena, size classes {:?}",
    pool.arena_size(),
    pool.size_classes()
  );
  print!("{}", pool.report());
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 1) Allocate an exact fit and write into it.
  // --------------------------------------------------------------------
  let first = pool.alloc(8);
  println!("\n[1] Allocate 8 bytes");
  print_alloc(&pool, 8, first);

  if let Some(first) = first {
    let first_ptr = first.as_ptr() as *mut u64;
    unsafe { first_ptr.write(0xDEADBEEF) };
    println!("[1] Value written = 0x{:X}", unsafe { first_ptr.read() });
  }

  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 2) An odd size is rounded up to the next size class.
  // --------------------------------------------------------------------
  let second = pool.alloc(12);
  println!("\n[2] Allocate 12 bytes");
  print_alloc(&pool, 12, second);

  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 3) Drain the 16 byte class: the last request borrows from 32.
  // --------------------------------------------------------------------
  println!("\n[3] Allocate 16 bytes until the 16 byte class runs dry");
  let mut held = Vec::new();
  for _ in 0..15 {
    let chunk = pool.alloc(16);
    print_alloc(&pool, 16, chunk);
    held.extend(chunk);
  }
  print!("{}", pool.report());

  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 4) Too large for any size class.
  // --------------------------------------------------------------------
  println!("\n[4] Allocate 64 bytes");
  print_alloc(&pool, 64, pool.alloc(64));

  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 5) Free, then allocate again to see the chunk reused.
  // --------------------------------------------------------------------
  if let Some(first) = first {
    pool.free(first.as_ptr());
    println!("\n[5] Freed {:?}", first);

    let reused = pool.alloc(8);
    print_alloc(&pool, 8, reused);
    println!(
      "[5] reused == first? {}",
      if reused == Some(first) { "Yes" } else { "No" }
    );

    // A second free of the same chunk is ignored.
    pool.free(first.as_ptr());
    pool.free(first.as_ptr());
  }

  for chunk in held {
    pool.free(chunk.as_ptr());
  }

  // --------------------------------------------------------------------
  // 6) End of demo. The 12 byte allocation is never freed and shows up
  //    in the report.
  // --------------------------------------------------------------------
  println!("\n[6] Final state:");
  print!("{}", pool.report());
}
