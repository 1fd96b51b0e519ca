//! TCP round-trip to the renderer.
//!
//! The wire protocol is a blocking request-reply: the serialized scene
//! goes out, and the renderer answers with a raw RGB8 framebuffer of
//! known size. No framing, no retries.

use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream};

use log::{debug, info};

use crate::serial::words_to_le_bytes;
use crate::util::Result;

/// Send the serialized scene and receive the rendered framebuffer
/// (`npixels * 3` bytes).
pub fn raytrace(host: &str, port: u16, words: &[u32], npixels: usize) -> Result<Vec<u8>> {
    info!("connecting to {}:{}", host, port);
    let mut stream = TcpStream::connect((host, port))?;

    let blob = words_to_le_bytes(words);
    stream.write_all(&blob)?;
    stream.shutdown(Shutdown::Write)?;
    debug!("sent {} bytes, awaiting {} bytes", blob.len(), npixels * 3);

    let mut frame = vec![0u8; npixels * 3];
    stream.read_exact(&mut frame)?;
    Ok(frame)
}
