//! Repository パターンの実装
//!
//! ドメイン層が定義する `UiStateRepository` trait の具体的な実装を提供します。
//! UseCase 層と UI 層は trait（ドメイン層）に依存し、この実装に直接依存しません（依存性の逆転）。

pub mod file;
pub mod inmemory;

pub use file::FileUiStateRepository;
pub use inmemory::InMemoryUiStateRepository;
