mod stack;
mod tower_interop;
