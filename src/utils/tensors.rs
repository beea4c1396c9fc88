use burn::tensor::{backend::Backend, Data, ElementConversion, Int, Shape, Tensor};

/// Pad token id sequences to a fixed length, truncating any that run longer
pub fn pad_to<B: Backend>(
    pad_token: usize,
    tokens_list: Vec<Vec<usize>>,
    seq_length: usize,
    device: &B::Device,
) -> Tensor<B, 2, Int> {
    let batch_size = tokens_list.len();

    let mut tensor = Tensor::zeros([batch_size, seq_length], device);
    tensor = tensor.add_scalar(pad_token as i64);

    for (index, mut tokens) in tokens_list.into_iter().enumerate() {
        tokens.truncate(seq_length);

        if tokens.is_empty() {
            continue;
        }

        let length = tokens.len();

        tensor = tensor.slice_assign(
            [index..index + 1, 0..length],
            Tensor::from_data(
                Data::new(
                    tokens
                        .into_iter()
                        .map(|e| (e as i64).elem::<B::IntElem>())
                        .collect(),
                    Shape::new([1, length]),
                ),
                device,
            ),
        );
    }

    tensor
}

#[cfg(test)]
mod tests {
    use burn::backend::NdArray;

    use super::*;

    #[test]
    fn test_pad_to_fills_and_truncates() {
        let device = Default::default();
        let tokens = pad_to::<NdArray>(0, vec![vec![4, 5], vec![], vec![1, 2, 3, 4, 5]], 4, &device);

        assert_eq!(tokens.dims(), [3, 4]);

        let values = tokens.into_data().convert::<i64>().value;
        assert_eq!(values, vec![4, 5, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4]);
    }
}
