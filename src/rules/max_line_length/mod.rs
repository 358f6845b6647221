pub(crate) mod max_line_length;
