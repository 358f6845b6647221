pub(crate) mod forbidden_comment;
