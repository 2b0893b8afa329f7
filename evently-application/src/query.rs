/// 应用层查询（Query）
///
/// 表达只读意图，不改变领域状态，也不会产生领域事件。
/// 转换器在构造集成事件时可通过查询总线补齐所需数据。
pub trait Query: Send + Sync + 'static {
    /// 查询的稳定名称（建议常量字符串，不随重构变化）
    const NAME: &'static str;

    /// 查询返回的数据传输对象（与领域模型解耦）
    type Output: Send + 'static;
}
