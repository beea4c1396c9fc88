/// Convolutional text classifier
pub mod text_cnn;

/// Pretrained word2vec embeddings
pub mod word2vec;
